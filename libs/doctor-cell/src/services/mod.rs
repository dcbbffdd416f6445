pub mod availability;

pub use availability::{AvailabilityService, AvailabilityStore, InMemoryAvailabilityStore};
