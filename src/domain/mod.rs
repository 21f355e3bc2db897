//! Domain layer: identifiers, validated records, and the pre-save pipeline.
//!
//! Everything here is pure: no I/O, no connection handling. Invalid field
//! values cannot be represented by the types exported from this module.

pub mod booking;
pub mod email;
pub mod event;
pub mod ids;
pub mod validation;

pub use booking::{Booking, BookingPatch, BookingUpdate, NewBooking};
pub use email::Email;
pub use event::{Event, NewEvent};
pub use ids::{BookingId, EventId};
pub use validation::{BookingChange, PreSaveStep};
