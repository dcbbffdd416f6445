//! Read-only access to the external profile store.
//!
//! The booking core only ever looks profiles up by id; creating and editing
//! them belongs to whoever owns the store.

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::profile::{ClientProfile, DoctorProfile};

use crate::supabase::SupabaseClient;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// `Ok(None)` when no doctor with that id exists.
    async fn doctor(&self, id: Uuid) -> Result<Option<DoctorProfile>>;

    /// `Ok(None)` when no client with that id exists.
    async fn client(&self, id: Uuid) -> Result<Option<ClientProfile>>;

    /// The public doctor directory, ordered by name.
    async fn doctors(&self) -> Result<Vec<DoctorProfile>>;
}

const DOCTOR_COLUMNS: &str = "id,full_name,email,phone,specialty,consultation_fee";

#[derive(Debug, Deserialize)]
struct DoctorRow {
    id: Uuid,
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
    specialty: Option<String>,
    consultation_fee: Option<f64>,
}

impl From<DoctorRow> for DoctorProfile {
    fn from(row: DoctorRow) -> Self {
        Self {
            id: row.id,
            name: row.full_name,
            email: row.email,
            phone: row.phone,
            specialization: row.specialty,
            consultation_fee: row.consultation_fee,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PatientRow {
    id: Uuid,
    full_name: String,
    email: Option<String>,
    phone: Option<String>,
}

impl From<PatientRow> for ClientProfile {
    fn from(row: PatientRow) -> Self {
        Self {
            id: row.id,
            name: row.full_name,
            email: row.email,
            phone: row.phone,
        }
    }
}

/// Profiles served by the Supabase REST API (`doctors` and `patients` tables).
pub struct SupabaseProfileStore {
    supabase: SupabaseClient,
}

impl SupabaseProfileStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    async fn rows<T>(&self, path: String) -> Result<Vec<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        self.supabase
            .get(&path)
            .await
            .with_context(|| format!("profile lookup failed: {}", path))
    }

    async fn first_row<T>(&self, path: String) -> Result<Option<T>>
    where
        T: serde::de::DeserializeOwned,
    {
        Ok(self.rows(path).await?.into_iter().next())
    }
}

#[async_trait]
impl ProfileStore for SupabaseProfileStore {
    async fn doctor(&self, id: Uuid) -> Result<Option<DoctorProfile>> {
        debug!("Fetching doctor profile {}", id);
        let path = format!("/rest/v1/doctors?id=eq.{}&select={}", id, DOCTOR_COLUMNS);
        Ok(self.first_row::<DoctorRow>(path).await?.map(DoctorProfile::from))
    }

    async fn client(&self, id: Uuid) -> Result<Option<ClientProfile>> {
        debug!("Fetching patient profile {}", id);
        let path = format!(
            "/rest/v1/patients?id=eq.{}&select=id,full_name,email,phone",
            id
        );
        Ok(self.first_row::<PatientRow>(path).await?.map(ClientProfile::from))
    }

    async fn doctors(&self) -> Result<Vec<DoctorProfile>> {
        debug!("Fetching doctor directory");
        let rows: Vec<DoctorRow> = self
            .rows(format!("/rest/v1/doctors?select={}&order=full_name.asc", DOCTOR_COLUMNS))
            .await?;
        Ok(rows.into_iter().map(DoctorProfile::from).collect())
    }
}

/// Profiles held in process, for local runs and tests.
#[derive(Default)]
pub struct InMemoryProfileStore {
    doctors: RwLock<HashMap<Uuid, DoctorProfile>>,
    clients: RwLock<HashMap<Uuid, ClientProfile>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put_doctor(&self, profile: DoctorProfile) {
        self.doctors.write().await.insert(profile.id, profile);
    }

    pub async fn put_client(&self, profile: ClientProfile) {
        self.clients.write().await.insert(profile.id, profile);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn doctor(&self, id: Uuid) -> Result<Option<DoctorProfile>> {
        Ok(self.doctors.read().await.get(&id).cloned())
    }

    async fn client(&self, id: Uuid) -> Result<Option<ClientProfile>> {
        Ok(self.clients.read().await.get(&id).cloned())
    }

    async fn doctors(&self) -> Result<Vec<DoctorProfile>> {
        let mut doctors: Vec<DoctorProfile> = self.doctors.read().await.values().cloned().collect();
        doctors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(doctors)
    }
}
