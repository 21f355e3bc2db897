//! # event-hub
//!
//! Event listing and booking service.
//!
//! Bookings reference events and are only stored when the referenced event
//! exists. All storage access goes through one memoized, single-flight
//! database connection.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)        raw JSON → typed drafts
//!     │
//!     ├── BookingService (service/)   pre-save pipeline, timestamps
//!     ├── Domain (domain/)            Email, NewBooking, PreSaveStep
//!     │
//!     ├── ConnectionManager           single-flight memoized handle
//!     └── PostgreSQL (persistence/)   events, bookings
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
