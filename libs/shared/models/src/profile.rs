use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Doctor profile as held by the external profile store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorProfile {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialization: Option<String>,
    pub consultation_fee: Option<f64>,
}

/// Client profile as held by the external profile store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientProfile {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// What a client sees about the doctor on an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorSummary {
    pub id: Uuid,
    pub name: String,
    pub specialization: Option<String>,
    pub consultation_fee: Option<f64>,
}

impl From<&DoctorProfile> for DoctorSummary {
    fn from(profile: &DoctorProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            specialization: profile.specialization.clone(),
            consultation_fee: profile.consultation_fee,
        }
    }
}

/// What a doctor sees about the client on an appointment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&ClientProfile> for ClientSummary {
    fn from(profile: &ClientProfile) -> Self {
        Self {
            id: profile.id,
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
        }
    }
}
