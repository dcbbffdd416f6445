// libs/appointment-cell/src/services/query.rs
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_database::ProfileStore;
use shared_models::auth::{Actor, UserRole};
use shared_models::profile::{ClientSummary, DoctorSummary};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, AppointmentStatusCounts, AppointmentView};
use crate::services::repository::AppointmentRepository;

/// Read-side projections of appointments, joined with profile data.
///
/// Profile lookups never fail a query: a missing profile or an unreachable
/// profile store leaves that part of the row empty.
pub struct AppointmentQueryService {
    repository: Arc<dyn AppointmentRepository>,
    profiles: Arc<dyn ProfileStore>,
}

impl AppointmentQueryService {
    pub fn new(repository: Arc<dyn AppointmentRepository>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { repository, profiles }
    }

    /// A doctor's appointments, ascending by date, each carrying the client's details.
    pub async fn list_for_provider(
        &self,
        actor: &Actor,
        doctor_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentView>, AppointmentError> {
        Self::require_self(actor, UserRole::Doctor, doctor_id)?;

        let appointments = Self::arrange(self.repository.list_by_doctor(doctor_id).await?, status);
        debug!("Listing {} appointments for doctor {}", appointments.len(), doctor_id);

        let clients = self.client_summaries(appointments.iter().map(|a| a.client_id)).await;

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentView {
                client: clients.get(&appointment.client_id).cloned().flatten(),
                doctor: None,
                appointment,
            })
            .collect())
    }

    /// A client's appointments, ascending by date, each carrying the doctor's details.
    pub async fn list_for_requester(
        &self,
        actor: &Actor,
        client_id: Uuid,
        status: Option<AppointmentStatus>,
    ) -> Result<Vec<AppointmentView>, AppointmentError> {
        Self::require_self(actor, UserRole::Client, client_id)?;

        let appointments = Self::arrange(self.repository.list_by_client(client_id).await?, status);
        debug!("Listing {} appointments for client {}", appointments.len(), client_id);

        let doctors = self.doctor_summaries(appointments.iter().map(|a| a.doctor_id)).await;

        Ok(appointments
            .into_iter()
            .map(|appointment| AppointmentView {
                client: None,
                doctor: doctors.get(&appointment.doctor_id).cloned().flatten(),
                appointment,
            })
            .collect())
    }

    /// Per-status counters for the caller's own appointments.
    pub async fn status_counts(&self, actor: &Actor) -> Result<AppointmentStatusCounts, AppointmentError> {
        let appointments = match actor.role {
            UserRole::Doctor => self.repository.list_by_doctor(actor.id).await?,
            UserRole::Client => self.repository.list_by_client(actor.id).await?,
        };

        Ok(AppointmentStatusCounts::tally(&appointments))
    }

    /// One appointment, visible only to its client and its doctor.
    pub async fn get_appointment(&self, actor: &Actor, appointment_id: Uuid) -> Result<AppointmentView, AppointmentError> {
        let appointment = self
            .repository
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::AppointmentNotFound(appointment_id))?;

        let is_party = match actor.role {
            UserRole::Doctor => appointment.doctor_id == actor.id,
            UserRole::Client => appointment.client_id == actor.id,
        };
        if !is_party {
            warn!("{} {} tried to view appointment {}", actor.role, actor.id, appointment_id);
            return Err(AppointmentError::Forbidden("Not authorized to view this appointment".to_string()));
        }

        let (client, doctor) = futures::join!(
            self.client_summary(appointment.client_id),
            self.doctor_summary(appointment.doctor_id),
        );

        Ok(AppointmentView {
            appointment,
            client,
            doctor,
        })
    }

    fn require_self(actor: &Actor, role: UserRole, owner: Uuid) -> Result<(), AppointmentError> {
        if actor.role != role || actor.id != owner {
            warn!("{} {} tried to list appointments of {} {}", actor.role, actor.id, role, owner);
            return Err(AppointmentError::Forbidden(format!("Only the {} can list these appointments", role)));
        }
        Ok(())
    }

    /// Filter, then order by date with time and creation as tie-breakers.
    fn arrange(mut appointments: Vec<Appointment>, status: Option<AppointmentStatus>) -> Vec<Appointment> {
        if let Some(status) = status {
            appointments.retain(|appointment| appointment.status == status);
        }

        appointments.sort_by(|a, b| {
            a.appointment_date
                .cmp(&b.appointment_date)
                .then_with(|| a.appointment_time.cmp(&b.appointment_time))
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        appointments
    }

    async fn doctor_summary(&self, doctor_id: Uuid) -> Option<DoctorSummary> {
        match self.profiles.doctor(doctor_id).await {
            Ok(Some(profile)) => Some(DoctorSummary::from(&profile)),
            Ok(None) => {
                warn!("No profile for doctor {}, returning base fields", doctor_id);
                None
            }
            Err(e) => {
                warn!("Doctor profile lookup failed for {}: {:#}", doctor_id, e);
                None
            }
        }
    }

    async fn client_summary(&self, client_id: Uuid) -> Option<ClientSummary> {
        match self.profiles.client(client_id).await {
            Ok(Some(profile)) => Some(ClientSummary::from(&profile)),
            Ok(None) => {
                warn!("No profile for client {}, returning base fields", client_id);
                None
            }
            Err(e) => {
                warn!("Client profile lookup failed for {}: {:#}", client_id, e);
                None
            }
        }
    }

    async fn doctor_summaries(&self, ids: impl Iterator<Item = Uuid>) -> HashMap<Uuid, Option<DoctorSummary>> {
        let ids: Vec<Uuid> = ids.collect::<HashSet<_>>().into_iter().collect();
        let summaries = join_all(ids.iter().map(|id| self.doctor_summary(*id))).await;
        ids.into_iter().zip(summaries).collect()
    }

    async fn client_summaries(&self, ids: impl Iterator<Item = Uuid>) -> HashMap<Uuid, Option<ClientSummary>> {
        let ids: Vec<Uuid> = ids.collect::<HashSet<_>>().into_iter().collect();
        let summaries = join_all(ids.iter().map(|id| self.client_summary(*id))).await;
        ids.into_iter().zip(summaries).collect()
    }
}
