// libs/appointment-cell/src/router.rs
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use doctor_cell::AvailabilityService;
use shared_config::AppConfig;
use shared_database::ProfileStore;
use shared_utils::extractor::auth_middleware;

use crate::handlers;
use crate::services::{
    AppointmentBookingService, AppointmentLifecycleService, AppointmentQueryService, AppointmentRepository,
};

#[derive(Clone)]
pub struct AppointmentState {
    pub config: Arc<AppConfig>,
    pub booking: Arc<AppointmentBookingService>,
    pub lifecycle: Arc<AppointmentLifecycleService>,
    pub queries: Arc<AppointmentQueryService>,
}

impl AppointmentState {
    /// Wire the three services over one repository so they share the slot index.
    pub fn new(
        config: Arc<AppConfig>,
        repository: Arc<dyn AppointmentRepository>,
        profiles: Arc<dyn ProfileStore>,
        availability: Arc<AvailabilityService>,
    ) -> Self {
        let booking = AppointmentBookingService::new(repository.clone(), profiles.clone(), availability)
            .with_enforced_availability(config.enforce_availability);

        Self {
            booking: Arc::new(booking),
            lifecycle: Arc::new(AppointmentLifecycleService::new(repository.clone())),
            queries: Arc::new(AppointmentQueryService::new(repository, profiles)),
            config,
        }
    }
}

pub fn appointment_routes(state: AppointmentState) -> Router {
    let protected_routes = Router::new()
        .route("/book", post(handlers::book_appointment))
        .route("/doctor", get(handlers::get_doctor_appointments))
        .route("/client", get(handlers::get_client_appointments))
        .route("/stats", get(handlers::get_appointment_stats))
        .route("/{appointment_id}", get(handlers::get_appointment))
        .route("/{appointment_id}/status", put(handlers::update_appointment_status))
        .route("/{appointment_id}/cancel", put(handlers::cancel_appointment))
        .layer(middleware::from_fn_with_state(state.config.clone(), auth_middleware));

    Router::new()
        .merge(protected_routes)
        .with_state(state)
}
