//! Service layer: business logic orchestration.
//!
//! [`BookingService`] is the single entry point for reads and writes; it
//! owns the shared [`crate::persistence::ConnectionManager`].

pub mod booking_service;

pub use booking_service::{BookingService, EventPage};
