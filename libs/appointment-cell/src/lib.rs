pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    Appointment, AppointmentError, AppointmentStatus, AppointmentStatusCounts, AppointmentView,
    BookAppointmentRequest, TimeSlot,
};
pub use router::{appointment_routes, AppointmentState};
pub use services::*;
