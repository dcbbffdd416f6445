use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_models::auth::{Actor, UserRole};

use crate::models::{parse_wall_clock, AvailabilityError, AvailabilitySlot, DayOfWeek};

/// Owns each doctor's declared weekly availability. Pure storage, no booking rules.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Replaces the doctor's whole slot list.
    async fn set_slots(&self, doctor_id: Uuid, slots: Vec<AvailabilitySlot>) -> Result<(), AvailabilityError>;

    /// Slots for one weekday, in declaration order.
    async fn get_slots(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<Vec<AvailabilitySlot>, AvailabilityError>;

    async fn get_all(&self, doctor_id: Uuid) -> Result<Vec<AvailabilitySlot>, AvailabilityError>;
}

#[derive(Default)]
pub struct InMemoryAvailabilityStore {
    slots: RwLock<HashMap<Uuid, Vec<AvailabilitySlot>>>,
}

impl InMemoryAvailabilityStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn set_slots(&self, doctor_id: Uuid, slots: Vec<AvailabilitySlot>) -> Result<(), AvailabilityError> {
        self.slots.write().await.insert(doctor_id, slots);
        Ok(())
    }

    async fn get_slots(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        Ok(self
            .slots
            .read()
            .await
            .get(&doctor_id)
            .map(|slots| slots.iter().filter(|slot| slot.day == day).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_all(&self, doctor_id: Uuid) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        Ok(self.slots.read().await.get(&doctor_id).cloned().unwrap_or_default())
    }
}

pub struct AvailabilityService {
    store: Arc<dyn AvailabilityStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AvailabilityStore>) -> Self {
        Self { store }
    }

    /// A doctor replaces their own weekly availability.
    pub async fn set_availability(
        &self,
        actor: &Actor,
        doctor_id: Uuid,
        slots: Vec<AvailabilitySlot>,
    ) -> Result<(), AvailabilityError> {
        if actor.role != UserRole::Doctor {
            warn!("{} {} tried to set availability", actor.role, actor.id);
            return Err(AvailabilityError::Forbidden("only doctors declare availability".to_string()));
        }
        if actor.id != doctor_id {
            warn!("Doctor {} tried to set availability of doctor {}", actor.id, doctor_id);
            return Err(AvailabilityError::Forbidden("doctors can only change their own availability".to_string()));
        }

        info!("Setting {} availability slots for doctor {}", slots.len(), doctor_id);
        self.store.set_slots(doctor_id, slots).await
    }

    pub async fn slots_for_day(&self, doctor_id: Uuid, day: DayOfWeek) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        self.store.get_slots(doctor_id, day).await
    }

    pub async fn all_slots(&self, doctor_id: Uuid) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        self.store.get_all(doctor_id).await
    }

    /// Whether an enabled slot on `date`'s weekday contains `time`.
    pub async fn covers(&self, doctor_id: Uuid, date: NaiveDate, time: &str) -> Result<bool, AvailabilityError> {
        let Some(time) = parse_wall_clock(time) else {
            return Ok(false);
        };

        let day = DayOfWeek::from(date.weekday());
        let slots = self.store.get_slots(doctor_id, day).await?;
        let covered = slots.iter().any(|slot| slot.covers(time));

        debug!("Doctor {} availability on {} at {}: {}", doctor_id, day, time, covered);
        Ok(covered)
    }
}
