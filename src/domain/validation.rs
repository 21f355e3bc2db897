//! Pre-save pipeline for bookings.
//!
//! Field rules are enforced by the typed constructors in
//! [`super::booking`]; what remains before a write is the referential check
//! on `eventId`. The persistence call site asks a [`BookingChange`] for its
//! ordered [`PreSaveStep`]s and runs each one before writing. The reference
//! is verified only when it is new or has changed.

use super::booking::{Booking, BookingUpdate};
use super::EventId;

/// A check that must pass before a booking is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreSaveStep {
    /// The event with this identifier must exist.
    VerifyEventReference(EventId),
}

/// A pending write to the `bookings` collection.
#[derive(Debug, Clone, Copy)]
pub enum BookingChange<'a> {
    /// A freshly stamped booking being inserted.
    Create(&'a Booking),
    /// An existing booking being rewritten.
    Update(&'a BookingUpdate),
}

impl BookingChange<'_> {
    /// Returns the checks to run, in order, before this change is written.
    #[must_use]
    pub fn pre_save_steps(&self) -> Vec<PreSaveStep> {
        match self {
            Self::Create(booking) => vec![PreSaveStep::VerifyEventReference(booking.event_id)],
            Self::Update(update) if update.event_id_changed => {
                vec![PreSaveStep::VerifyEventReference(update.booking.event_id)]
            }
            Self::Update(_) => Vec::new(),
        }
    }
}
