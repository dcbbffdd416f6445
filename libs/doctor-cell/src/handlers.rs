use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{AvailabilityError, AvailabilityQuery, SetAvailabilityRequest};
use crate::router::DoctorState;

impl From<AvailabilityError> for AppError {
    fn from(error: AvailabilityError) -> Self {
        match error {
            AvailabilityError::Forbidden(msg) => AppError::Forbidden(msg),
        }
    }
}

fn directory_error(error: anyhow::Error) -> AppError {
    error!("Doctor directory lookup failed: {:#}", error);
    AppError::Internal(error.to_string())
}

#[axum::debug_handler]
pub async fn list_doctors(State(state): State<DoctorState>) -> Result<Json<Value>, AppError> {
    let doctors = state.profiles.doctors().await.map_err(directory_error)?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor = state
        .profiles
        .doctor(doctor_id)
        .await
        .map_err(directory_error)?
        .ok_or_else(|| AppError::NotFound(format!("Doctor {} not found", doctor_id)))?;

    Ok(Json(json!(doctor)))
}

/// A doctor replaces their own weekly availability.
#[axum::debug_handler]
pub async fn set_availability(
    State(state): State<DoctorState>,
    Extension(user): Extension<User>,
    Json(request): Json<SetAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    state
        .availability
        .set_availability(&actor, actor.id, request.available_slots.clone())
        .await?;

    Ok(Json(json!({
        "success": true,
        "doctor_id": actor.id,
        "available_slots": request.available_slots,
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<DoctorState>,
    Path(doctor_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let slots = match query.day {
        Some(day) => state.availability.slots_for_day(doctor_id, day).await?,
        None => state.availability.all_slots(doctor_id).await?,
    };

    Ok(Json(json!({
        "doctor_id": doctor_id,
        "available_slots": slots,
    })))
}
