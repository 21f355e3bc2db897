//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire; timestamps are RFC 3339.

pub mod booking_dto;
pub mod common_dto;
pub mod event_dto;

pub use booking_dto::*;
pub use common_dto::*;
pub use event_dto::*;
