//! Database row shapes for events and bookings.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Booking, BookingId, Email, Event, EventId};
use crate::error::StoreError;

/// A row from the `bookings` table:
/// `(id, event_id, email, created_at, updated_at)`.
pub type BookingRow = (Uuid, Uuid, String, DateTime<Utc>, DateTime<Utc>);

/// A row from the `events` table:
/// `(id, title, slug, location, starts_at, created_at)`.
pub type EventRow = (Uuid, String, String, String, DateTime<Utc>, DateTime<Utc>);

/// Column list matching [`BookingRow`].
pub const BOOKING_COLUMNS: &str = "id, event_id, email, created_at, updated_at";

/// Column list matching [`EventRow`].
pub const EVENT_COLUMNS: &str = "id, title, slug, location, starts_at, created_at";

/// Converts a stored booking row back into a [`Booking`].
///
/// The email is re-validated so a row written outside this service cannot
/// smuggle an invalid address into the domain.
///
/// # Errors
///
/// Returns [`StoreError::Decode`] if the stored email is not valid.
pub fn booking_from_row(row: BookingRow) -> Result<Booking, StoreError> {
    let (id, event_id, email, created_at, updated_at) = row;
    let email = Email::parse(&email)
        .map_err(|e| StoreError::Decode(format!("booking {id}: {e}")))?;
    Ok(Booking {
        id: BookingId::from_uuid(id),
        event_id: EventId::from_uuid(event_id),
        email,
        created_at,
        updated_at,
    })
}

/// Converts a stored event row back into an [`Event`].
#[must_use]
pub fn event_from_row(row: EventRow) -> Event {
    let (id, title, slug, location, starts_at, created_at) = row;
    Event {
        id: EventId::from_uuid(id),
        title,
        slug,
        location,
        starts_at,
        created_at,
    }
}
