// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_models::auth::{User, UserRole};
use shared_models::error::AppError;

use crate::models::{AppointmentError, AppointmentListQuery, BookAppointmentRequest, UpdateStatusRequest};
use crate::router::AppointmentState;

impl From<AppointmentError> for AppError {
    fn from(error: AppointmentError) -> Self {
        match error {
            AppointmentError::Validation(msg) => AppError::ValidationError(msg),
            e @ AppointmentError::AppointmentNotFound(_) => AppError::NotFound(e.to_string()),
            e @ AppointmentError::DoctorNotFound(_) => AppError::NotFound(e.to_string()),
            e @ AppointmentError::Conflict => AppError::Conflict(e.to_string()),
            AppointmentError::Forbidden(msg) => AppError::Forbidden(msg),
            e @ AppointmentError::IllegalTransition { .. } => AppError::IllegalTransition(e.to_string()),
            AppointmentError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

// ==============================================================================
// BOOKING
// ==============================================================================

/// A client books a pending appointment with a doctor.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let actor = user.actor()?;

    let appointment = state.booking.book_appointment(&actor, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment,
            "message": "Appointment request submitted",
        })),
    ))
}

// ==============================================================================
// LISTINGS
// ==============================================================================

#[axum::debug_handler]
pub async fn get_doctor_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    let appointments = state.queries.list_for_provider(&actor, actor.id, query.status).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_client_appointments(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentListQuery>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    let appointments = state.queries.list_for_requester(&actor, actor.id, query.status).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_appointment_stats(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    let counts = state.queries.status_counts(&actor).await?;

    Ok(Json(json!({
        "role": actor.role,
        "stats": counts,
    })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    let appointment = state.queries.get_appointment(&actor, appointment_id).await?;

    Ok(Json(json!(appointment)))
}

// ==============================================================================
// STATUS CHANGES
// ==============================================================================

/// Doctor accepts, rejects or completes one of their appointments.
#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    // Clients cancel through the cancel route only
    if actor.role != UserRole::Doctor {
        return Err(AppError::Forbidden("Only doctors can update appointment status".to_string()));
    }

    let appointment = state
        .lifecycle
        .transition(appointment_id, &actor, request.status, request.doctor_notes)
        .await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": format!("Appointment {}", appointment.status),
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<AppointmentState>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let actor = user.actor()?;

    let appointment = state.lifecycle.cancel(appointment_id, &actor).await?;

    Ok(Json(json!({
        "success": true,
        "appointment": appointment,
        "message": "Appointment cancelled",
    })))
}
