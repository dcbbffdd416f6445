// libs/appointment-cell/src/services/lifecycle.rs
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use shared_models::auth::{Actor, UserRole};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, StatusChange};
use crate::services::repository::AppointmentRepository;

/// Owns the appointment status machine:
///
/// | from     | to        | invoked by |
/// |----------|-----------|------------|
/// | pending  | accepted  | doctor     |
/// | pending  | rejected  | doctor     |
/// | accepted | completed | doctor     |
/// | pending  | cancelled | client     |
/// | accepted | cancelled | client     |
///
/// Rejected, completed and cancelled are terminal.
pub struct AppointmentLifecycleService {
    repository: Arc<dyn AppointmentRepository>,
}

impl AppointmentLifecycleService {
    pub fn new(repository: Arc<dyn AppointmentRepository>) -> Self {
        Self { repository }
    }

    /// The role allowed to move an appointment from `from` to `to`, if any.
    pub fn required_role(from: AppointmentStatus, to: AppointmentStatus) -> Option<UserRole> {
        use AppointmentStatus::*;

        match (from, to) {
            (Pending, Accepted) | (Pending, Rejected) | (Accepted, Completed) => Some(UserRole::Doctor),
            (Pending, Cancelled) | (Accepted, Cancelled) => Some(UserRole::Client),
            _ => None,
        }
    }

    /// Validate that `role` may move an appointment from `current_status` to `new_status`.
    pub fn validate_status_transition(
        current_status: AppointmentStatus,
        new_status: AppointmentStatus,
        role: UserRole,
    ) -> Result<(), AppointmentError> {
        debug!("Validating status transition from {} to {} by {}", current_status, new_status, role);

        match Self::required_role(current_status, new_status) {
            Some(required) if required == role => Ok(()),
            _ => {
                warn!("Invalid status transition attempted: {} -> {} by {}", current_status, new_status, role);
                Err(AppointmentError::IllegalTransition {
                    from: current_status,
                    to: new_status,
                })
            }
        }
    }

    /// Doctors act on their own appointments, clients on theirs.
    fn authorize(appointment: &Appointment, actor: &Actor) -> Result<(), AppointmentError> {
        let owner = match actor.role {
            UserRole::Doctor => appointment.doctor_id,
            UserRole::Client => appointment.client_id,
        };

        if owner != actor.id {
            warn!("{} {} does not own appointment {}", actor.role, actor.id, appointment.id);
            return Err(AppointmentError::Forbidden(
                "Not authorized to update this appointment".to_string(),
            ));
        }

        Ok(())
    }

    /// Move an appointment to `target` on behalf of `actor`.
    ///
    /// Legality of the move is checked before ownership, so an out-of-table
    /// move is `IllegalTransition` whoever asks. Doctor notes are kept only on
    /// doctor-invoked moves; blank notes are ignored.
    #[instrument(skip(self, doctor_notes), fields(actor_id = %actor.id, role = %actor.role))]
    pub async fn transition(
        &self,
        appointment_id: Uuid,
        actor: &Actor,
        target: AppointmentStatus,
        doctor_notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let current = self
            .repository
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::AppointmentNotFound(appointment_id))?;

        Self::validate_status_transition(current.status, target, actor.role)?;
        Self::authorize(&current, actor)?;

        let doctor_notes = match actor.role {
            UserRole::Doctor => doctor_notes
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
            UserRole::Client => None,
        };

        let updated = self
            .repository
            .compare_and_set_status(
                appointment_id,
                current.status,
                StatusChange {
                    to: target,
                    doctor_notes,
                },
            )
            .await?;

        info!("Appointment {} moved {} -> {}", appointment_id, current.status, updated.status);
        Ok(updated)
    }

    /// Client-side cancellation of a pending or accepted appointment.
    pub async fn cancel(&self, appointment_id: Uuid, actor: &Actor) -> Result<Appointment, AppointmentError> {
        if actor.role != UserRole::Client {
            warn!("{} {} used the client cancel operation", actor.role, actor.id);
            return Err(AppointmentError::Forbidden(
                "Only the booking client can cancel an appointment".to_string(),
            ));
        }

        self.transition(appointment_id, actor, AppointmentStatus::Cancelled, None)
            .await
    }
}
