// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use doctor_cell::AvailabilityService;
use shared_database::ProfileStore;
use shared_models::auth::{Actor, UserRole};
use shared_models::profile::DoctorSummary;

use crate::models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentView, BookAppointmentRequest, TimeSlot,
};
use crate::services::repository::AppointmentRepository;

/// Booking entry point: validates a client's request and reserves the slot.
pub struct AppointmentBookingService {
    repository: Arc<dyn AppointmentRepository>,
    profiles: Arc<dyn ProfileStore>,
    availability: Arc<AvailabilityService>,
    enforce_availability: bool,
}

impl AppointmentBookingService {
    pub fn new(
        repository: Arc<dyn AppointmentRepository>,
        profiles: Arc<dyn ProfileStore>,
        availability: Arc<AvailabilityService>,
    ) -> Self {
        Self {
            repository,
            profiles,
            availability,
            enforce_availability: false,
        }
    }

    /// Reject bookings that no enabled availability slot covers.
    pub fn with_enforced_availability(mut self, enforce: bool) -> Self {
        self.enforce_availability = enforce;
        self
    }

    /// Book an appointment for the calling client. Nothing is stored unless every
    /// check passes, and the slot check and insert happen as one repository write.
    #[instrument(skip(self, request), fields(doctor_id = %request.doctor_id, date = %request.appointment_date))]
    pub async fn book_appointment(
        &self,
        actor: &Actor,
        request: BookAppointmentRequest,
    ) -> Result<AppointmentView, AppointmentError> {
        info!("Booking appointment for client {} with doctor {}", actor.id, request.doctor_id);

        if actor.role != UserRole::Client {
            warn!("{} {} attempted to book an appointment", actor.role, actor.id);
            return Err(AppointmentError::Forbidden("Only clients can book appointments".to_string()));
        }

        let reason = request.reason.trim();
        if reason.is_empty() {
            return Err(AppointmentError::Validation("Reason for appointment is required".to_string()));
        }

        let time = TimeSlot::parse(&request.appointment_time)?;

        let doctor = self
            .profiles
            .doctor(request.doctor_id)
            .await
            .map_err(|e| {
                error!("Doctor lookup failed for {}: {:#}", request.doctor_id, e);
                AppointmentError::Internal(format!("doctor lookup failed: {}", e))
            })?
            .ok_or(AppointmentError::DoctorNotFound(request.doctor_id))?;

        if self.enforce_availability {
            self.ensure_within_availability(request.doctor_id, &request, &time).await?;
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: actor.id,
            doctor_id: request.doctor_id,
            appointment_date: request.appointment_date,
            appointment_time: time,
            status: AppointmentStatus::Pending,
            reason: reason.to_string(),
            notes: request
                .notes
                .map(|notes| notes.trim().to_string())
                .filter(|notes| !notes.is_empty()),
            doctor_notes: None,
            created_at: now,
            updated_at: now,
        };

        let appointment = self.repository.insert_if_slot_free(appointment).await?;

        info!(
            "Appointment {} booked: doctor {} on {} at {}",
            appointment.id, appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
        );

        Ok(AppointmentView {
            appointment,
            client: None,
            doctor: Some(DoctorSummary::from(&doctor)),
        })
    }

    async fn ensure_within_availability(
        &self,
        doctor_id: Uuid,
        request: &BookAppointmentRequest,
        time: &TimeSlot,
    ) -> Result<(), AppointmentError> {
        let covered = self
            .availability
            .covers(doctor_id, request.appointment_date, time.as_str())
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?;

        debug!("Availability check for doctor {} at {}: {}", doctor_id, time, covered);

        if !covered {
            return Err(AppointmentError::Validation(format!(
                "Doctor is not available on {} at {}",
                request.appointment_date, time
            )));
        }

        Ok(())
    }
}
