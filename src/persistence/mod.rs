//! Persistence layer: connection management and the storage traits.
//!
//! [`connection::ConnectionManager`] memoizes a handle produced by a
//! [`connection::Connector`]. The handle implements [`EventStore`] and
//! [`BookingStore`]; the concrete implementation uses `sqlx::PgPool` for
//! async PostgreSQL access.

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::domain::{Booking, BookingId, Email, Event, EventId};
use crate::error::StoreError;

pub mod connection;
#[cfg(test)]
pub(crate) mod memory;
pub mod models;
pub mod postgres;

pub use connection::{ConnectionManager, Connector};
pub use postgres::{PgConnector, PostgresStore};

/// Access to the `events` collection.
pub trait EventStore: Send + Sync {
    /// Returns whether an event with this identifier exists.
    fn event_exists(&self, id: EventId) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Inserts a new event.
    fn insert_event(&self, event: &Event) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Lists events ordered by start time, skipping `offset` and returning at
    /// most `limit`.
    fn list_events(
        &self,
        limit: u32,
        offset: u32,
    ) -> impl Future<Output = Result<Vec<Event>, StoreError>> + Send;

    /// Returns the total number of events.
    fn count_events(&self) -> impl Future<Output = Result<u64, StoreError>> + Send;
}

/// Access to the `bookings` collection.
pub trait BookingStore: Send + Sync {
    /// Inserts a new booking.
    fn insert_booking(
        &self,
        booking: &Booking,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Overwrites the mutable fields of a booking whose stored `updated_at`
    /// is still `expected_updated_at`. Returns `false` if no such row exists,
    /// either because the booking is gone or because another write landed
    /// first.
    fn update_booking(
        &self,
        booking: &Booking,
        expected_updated_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Loads a booking by identifier.
    fn find_booking(
        &self,
        id: BookingId,
    ) -> impl Future<Output = Result<Option<Booking>, StoreError>> + Send;

    /// Lists bookings for an event, newest first.
    fn bookings_for_event(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Booking>, StoreError>> + Send;

    /// Finds the booking `email` made for `event_id`, if any.
    fn find_booking_by_email(
        &self,
        event_id: EventId,
        email: &Email,
    ) -> impl Future<Output = Result<Option<Booking>, StoreError>> + Send;
}
