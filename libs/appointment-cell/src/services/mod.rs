pub mod booking;
pub mod lifecycle;
pub mod query;
pub mod repository;

pub use booking::AppointmentBookingService;
pub use lifecycle::AppointmentLifecycleService;
pub use query::AppointmentQueryService;
pub use repository::{AppointmentRepository, InMemoryAppointmentRepository};
