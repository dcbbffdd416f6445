// libs/appointment-cell/src/services/repository.rs
//
// Appointment storage with the conditional writes booking relies on.
//

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{Appointment, AppointmentError, AppointmentStatus, SlotKey, StatusChange};

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Inserts `appointment` unless another active appointment holds its slot.
    /// Check and insert are one atomic step; a taken slot yields `Conflict`.
    async fn insert_if_slot_free(&self, appointment: Appointment) -> Result<Appointment, AppointmentError>;

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError>;

    /// Applies `change` only while the record still has status `expected`.
    /// A record that moved on fails with `IllegalTransition` from its actual status.
    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Appointment, AppointmentError>;

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, AppointmentError>;
}

#[derive(Default)]
struct RepositoryState {
    records: HashMap<Uuid, Appointment>,
    // Unique index over active appointments only.
    active_slots: HashMap<SlotKey, Uuid>,
}

/// Process-local repository. Records and the active-slot index share one lock,
/// so every write sees and updates both together.
#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    state: RwLock<RepositoryState>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn insert_if_slot_free(&self, appointment: Appointment) -> Result<Appointment, AppointmentError> {
        if !appointment.status.is_active() {
            return Err(AppointmentError::Internal(format!(
                "refusing to create appointment {} in status {}",
                appointment.id, appointment.status
            )));
        }

        let key = appointment.slot_key();
        let mut state = self.state.write().await;

        if let Some(holder) = state.active_slots.get(&key) {
            warn!("Slot {} already held by appointment {}", key, holder);
            return Err(AppointmentError::Conflict);
        }
        if state.records.contains_key(&appointment.id) {
            return Err(AppointmentError::Internal(format!("duplicate appointment id {}", appointment.id)));
        }

        state.active_slots.insert(key, appointment.id);
        state.records.insert(appointment.id, appointment.clone());

        debug!("Stored appointment {}", appointment.id);
        Ok(appointment)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self.state.read().await.records.get(&id).cloned())
    }

    async fn compare_and_set_status(
        &self,
        id: Uuid,
        expected: AppointmentStatus,
        change: StatusChange,
    ) -> Result<Appointment, AppointmentError> {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let record = state
            .records
            .get_mut(&id)
            .ok_or(AppointmentError::AppointmentNotFound(id))?;

        if record.status != expected {
            warn!(
                "Appointment {} is {} (expected {}), not moving to {}",
                id, record.status, expected, change.to
            );
            return Err(AppointmentError::IllegalTransition {
                from: record.status,
                to: change.to,
            });
        }

        let frees_slot = record.status.is_active() && change.to.is_terminal();

        record.status = change.to;
        if let Some(notes) = change.doctor_notes {
            record.doctor_notes = Some(notes);
        }
        record.updated_at = Utc::now();

        if frees_slot {
            let key = record.slot_key();
            if state.active_slots.get(&key) == Some(&id) {
                state.active_slots.remove(&key);
                debug!("Released slot {}", key);
            }
        }

        Ok(record.clone())
    }

    async fn list_by_doctor(&self, doctor_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .values()
            .filter(|appointment| appointment.doctor_id == doctor_id)
            .cloned()
            .collect())
    }

    async fn list_by_client(&self, client_id: Uuid) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .values()
            .filter(|appointment| appointment.client_id == client_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;
    use chrono::NaiveDate;

    fn pending(doctor_id: Uuid, time: &str) -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            doctor_id,
            appointment_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            appointment_time: TimeSlot::parse(time).unwrap(),
            status: AppointmentStatus::Pending,
            reason: "checkup".to_string(),
            notes: None,
            doctor_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn change(to: AppointmentStatus) -> StatusChange {
        StatusChange { to, doctor_notes: None }
    }

    #[tokio::test]
    async fn test_second_active_insert_conflicts() {
        let repository = InMemoryAppointmentRepository::new();
        let doctor_id = Uuid::new_v4();

        repository.insert_if_slot_free(pending(doctor_id, "10:00")).await.unwrap();
        let second = repository.insert_if_slot_free(pending(doctor_id, "10:00")).await;
        assert_eq!(second, Err(AppointmentError::Conflict));

        // A different time for the same doctor is a different slot.
        repository.insert_if_slot_free(pending(doctor_id, "10:30")).await.unwrap();
        assert_eq!(repository.list_by_doctor(doctor_id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_terminal_status_releases_slot() {
        let repository = InMemoryAppointmentRepository::new();
        let doctor_id = Uuid::new_v4();
        let first = repository.insert_if_slot_free(pending(doctor_id, "10:00")).await.unwrap();

        repository
            .compare_and_set_status(first.id, AppointmentStatus::Pending, change(AppointmentStatus::Accepted))
            .await
            .unwrap();
        assert_eq!(
            repository.insert_if_slot_free(pending(doctor_id, "10:00")).await,
            Err(AppointmentError::Conflict)
        );

        repository
            .compare_and_set_status(first.id, AppointmentStatus::Accepted, change(AppointmentStatus::Completed))
            .await
            .unwrap();
        repository.insert_if_slot_free(pending(doctor_id, "10:00")).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_expected_status_leaves_record_untouched() {
        let repository = InMemoryAppointmentRepository::new();
        let stored = repository.insert_if_slot_free(pending(Uuid::new_v4(), "10:00")).await.unwrap();

        let result = repository
            .compare_and_set_status(stored.id, AppointmentStatus::Accepted, change(AppointmentStatus::Completed))
            .await;
        assert_eq!(
            result,
            Err(AppointmentError::IllegalTransition {
                from: AppointmentStatus::Pending,
                to: AppointmentStatus::Completed,
            })
        );

        let reloaded = repository.get(stored.id).await.unwrap().unwrap();
        assert_eq!(reloaded, stored);
    }

    #[tokio::test]
    async fn test_missing_record() {
        let repository = InMemoryAppointmentRepository::new();
        let id = Uuid::new_v4();
        assert!(repository.get(id).await.unwrap().is_none());
        assert_eq!(
            repository
                .compare_and_set_status(id, AppointmentStatus::Pending, change(AppointmentStatus::Accepted))
                .await,
            Err(AppointmentError::AppointmentNotFound(id))
        );
    }
}
