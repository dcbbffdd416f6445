use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::{appointment_routes, AppointmentState};
use appointment_cell::InMemoryAppointmentRepository;
use doctor_cell::router::{doctor_routes, DoctorState};
use doctor_cell::{AvailabilityService, AvailabilityStore};
use shared_config::AppConfig;
use shared_database::ProfileStore;

pub fn build_states(
    config: Arc<AppConfig>,
    profiles: Arc<dyn ProfileStore>,
    availability_store: Arc<dyn AvailabilityStore>,
) -> (DoctorState, AppointmentState) {
    let availability = Arc::new(AvailabilityService::new(availability_store));

    let doctors = DoctorState {
        config: config.clone(),
        profiles: profiles.clone(),
        availability: availability.clone(),
    };
    let appointments = AppointmentState::new(
        config,
        Arc::new(InMemoryAppointmentRepository::new()),
        profiles,
        availability,
    );

    (doctors, appointments)
}

pub fn create_router(doctors: DoctorState, appointments: AppointmentState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/appointments", appointment_routes(appointments))
        .nest("/doctors", doctor_routes(doctors))
}
