//! Booking service: obtains the shared connection, runs the pre-save
//! pipeline, and writes.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::domain::{
    Booking, BookingChange, BookingId, BookingPatch, Email, Event, EventId, NewBooking, NewEvent,
    PreSaveStep,
};
use crate::error::{AppError, ReferenceError, StoreError};
use crate::persistence::{BookingStore, ConnectionManager, Connector, EventStore};

/// A page of events plus the total count.
#[derive(Debug, Clone)]
pub struct EventPage {
    /// Events on this page, ordered by start time.
    pub events: Vec<Event>,
    /// Total number of events across all pages.
    pub total: u64,
}

/// Orchestration layer for event and booking operations.
///
/// Every write follows the same shape: validated input → shared connection
/// → stamp → pre-save steps → write. A step that fails leaves storage
/// untouched.
#[derive(Debug)]
pub struct BookingService<C: Connector> {
    connections: Arc<ConnectionManager<C>>,
    query_timeout: Duration,
}

impl<C> BookingService<C>
where
    C: Connector,
    C::Handle: EventStore + BookingStore,
{
    /// Creates a new `BookingService`.
    #[must_use]
    pub fn new(connections: Arc<ConnectionManager<C>>, query_timeout: Duration) -> Self {
        Self {
            connections,
            query_timeout,
        }
    }

    /// Returns a reference to the inner [`ConnectionManager`].
    #[must_use]
    pub fn connections(&self) -> &Arc<ConnectionManager<C>> {
        &self.connections
    }

    /// Stamps and persists a new booking.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] if no connection is available,
    /// [`AppError::Reference`] if the event does not exist or could not be
    /// checked, and [`AppError::Persistence`] if the insert fails.
    pub async fn create_booking(&self, draft: NewBooking) -> Result<Booking, AppError> {
        let store = self.connections.get().await?;
        let booking = Booking::stamp(draft, Utc::now());
        let change = BookingChange::Create(&booking);

        self.run_pre_save(&store, &change).await?;
        store.insert_booking(&booking).await?;

        tracing::info!(booking_id = %booking.id, event_id = %booking.event_id, "booking created");
        Ok(booking)
    }

    /// Applies a partial update to an existing booking.
    ///
    /// The event reference is only re-checked if the patch changes it. A
    /// patch that changes nothing returns the stored booking without a write.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if the booking does not exist,
    /// [`AppError::BookingConflict`] if another write changed it after it was
    /// read, plus the same errors as [`Self::create_booking`].
    pub async fn update_booking(
        &self,
        id: BookingId,
        patch: &BookingPatch,
    ) -> Result<Booking, AppError> {
        let store = self.connections.get().await?;
        let current = store
            .find_booking(id)
            .await?
            .ok_or(AppError::BookingNotFound(id))?;

        let Some(update) = current.apply(patch, Utc::now()) else {
            tracing::debug!(booking_id = %id, "update changes nothing; skipping write");
            return Ok(current);
        };
        let change = BookingChange::Update(&update);

        self.run_pre_save(&store, &change).await?;
        if !store.update_booking(&update.booking, current.updated_at).await? {
            if store.find_booking(id).await?.is_none() {
                return Err(AppError::BookingNotFound(id));
            }
            tracing::debug!(booking_id = %id, "booking changed since it was read");
            return Err(AppError::BookingConflict(id));
        }

        tracing::info!(
            booking_id = %id,
            event_changed = update.event_id_changed,
            "booking updated"
        );
        Ok(update.booking)
    }

    /// Loads a booking by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BookingNotFound`] if it does not exist.
    pub async fn get_booking(&self, id: BookingId) -> Result<Booking, AppError> {
        let store = self.connections.get().await?;
        store
            .find_booking(id)
            .await?
            .ok_or(AppError::BookingNotFound(id))
    }

    /// Lists bookings for an event, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] or [`AppError::Persistence`] on
    /// storage failure.
    pub async fn bookings_for_event(&self, event_id: EventId) -> Result<Vec<Booking>, AppError> {
        let store = self.connections.get().await?;
        Ok(store.bookings_for_event(event_id).await?)
    }

    /// Returns the booking `email` made for `event_id`, if there is one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] or [`AppError::Persistence`] on
    /// storage failure.
    pub async fn find_booking(
        &self,
        event_id: EventId,
        email: &Email,
    ) -> Result<Option<Booking>, AppError> {
        let store = self.connections.get().await?;
        Ok(store.find_booking_by_email(event_id, email).await?)
    }

    /// Stores a new event.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] or [`AppError::Persistence`] on
    /// storage failure.
    pub async fn create_event(&self, draft: NewEvent) -> Result<Event, AppError> {
        let store = self.connections.get().await?;
        let event = draft.stamp(Utc::now());
        store.insert_event(&event).await?;
        tracing::info!(event_id = %event.id, slug = %event.slug, "event created");
        Ok(event)
    }

    /// Lists events ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Connection`] or [`AppError::Persistence`] on
    /// storage failure.
    pub async fn list_events(&self, limit: u32, offset: u32) -> Result<EventPage, AppError> {
        let store = self.connections.get().await?;
        let events = store.list_events(limit, offset).await?;
        let total = store.count_events().await?;
        Ok(EventPage { events, total })
    }

    async fn run_pre_save(
        &self,
        store: &C::Handle,
        change: &BookingChange<'_>,
    ) -> Result<(), AppError> {
        for step in change.pre_save_steps() {
            match step {
                PreSaveStep::VerifyEventReference(event_id) => {
                    self.verify_event_reference(store, event_id).await?;
                }
            }
        }
        Ok(())
    }

    async fn verify_event_reference(
        &self,
        store: &C::Handle,
        event_id: EventId,
    ) -> Result<(), ReferenceError> {
        let lookup = tokio::time::timeout(self.query_timeout, store.event_exists(event_id))
            .await
            .unwrap_or(Err(StoreError::Timeout(self.query_timeout)));

        match lookup {
            Ok(true) => Ok(()),
            Ok(false) => {
                tracing::debug!(%event_id, "rejecting booking for missing event");
                Err(ReferenceError::EventNotFound(event_id))
            }
            Err(source) => {
                tracing::warn!(%event_id, error = %source, "event reference lookup failed");
                Err(ReferenceError::LookupFailed { event_id, source })
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::error::ConnectionError;
    use crate::persistence::memory::MemoryConnector;

    const QUERY_TIMEOUT: Duration = Duration::from_secs(1);

    fn make_service(connector: &MemoryConnector) -> BookingService<MemoryConnector> {
        let manager = ConnectionManager::new(connector.clone(), Duration::from_secs(1));
        BookingService::new(Arc::new(manager), QUERY_TIMEOUT)
    }

    fn email(raw: &str) -> Email {
        let Ok(email) = Email::parse(raw) else {
            panic!("test email {raw} should be valid");
        };
        email
    }

    async fn seed_event(service: &BookingService<MemoryConnector>) -> EventId {
        let Ok(draft) = NewEvent::parse("Rust Meetup", "Berlin", Utc::now()) else {
            panic!("valid event");
        };
        let Ok(event) = service.create_event(draft).await else {
            panic!("event creation failed");
        };
        event.id
    }

    #[tokio::test]
    async fn create_rejects_missing_event_without_writing() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);

        let draft = NewBooking::new(EventId::new(), email("a@b.co"));
        let result = service.create_booking(draft).await;

        let Err(AppError::Reference(ReferenceError::EventNotFound(_))) = result else {
            panic!("expected EventNotFound");
        };
        assert_eq!(connector.store().booking_count().await, 0);
    }

    #[tokio::test]
    async fn create_with_existing_event_stamps_equal_timestamps() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;

        let draft = NewBooking::new(event_id, email("A@B.co"));
        let booking = tokio_test::assert_ok!(service.create_booking(draft).await);

        assert_eq!(booking.created_at, booking.updated_at);
        assert_eq!(booking.email.as_str(), "a@b.co");
        assert_eq!(connector.store().booking_count().await, 1);
    }

    #[tokio::test]
    async fn failed_lookup_is_distinct_from_missing_event() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        connector.store().set_events_unreachable(true);

        let result = service
            .create_booking(NewBooking::new(event_id, email("a@b.co")))
            .await;
        let Err(AppError::Reference(ReferenceError::LookupFailed { event_id: failed, .. })) =
            result
        else {
            panic!("expected LookupFailed");
        };
        assert_eq!(failed, event_id);
        assert_eq!(connector.store().booking_count().await, 0);
    }

    #[tokio::test]
    async fn email_only_update_skips_reference_check() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        let Ok(created) = service
            .create_booking(NewBooking::new(event_id, email("a@b.co")))
            .await
        else {
            panic!("booking creation failed");
        };

        connector.store().set_events_unreachable(true);
        let patch = BookingPatch::default().with_email(email("new@b.co"));
        let Ok(updated) = service.update_booking(created.id, &patch).await else {
            panic!("email-only update must not touch the events collection");
        };

        assert_eq!(updated.email.as_str(), "new@b.co");
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn changing_event_rechecks_reference() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        let Ok(created) = service
            .create_booking(NewBooking::new(event_id, email("a@b.co")))
            .await
        else {
            panic!("booking creation failed");
        };

        let patch = BookingPatch::default().with_event_id(EventId::new());
        let result = service.update_booking(created.id, &patch).await;
        assert!(matches!(
            result,
            Err(AppError::Reference(ReferenceError::EventNotFound(_)))
        ));

        let Ok(stored) = service.get_booking(created.id).await else {
            panic!("booking should still exist");
        };
        assert_eq!(stored, created);
    }

    #[tokio::test]
    async fn updated_at_strictly_increases_across_updates() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        let Ok(mut previous) = service
            .create_booking(NewBooking::new(event_id, email("a@b.co")))
            .await
        else {
            panic!("booking creation failed");
        };
        let created_at = previous.created_at;

        for n in 0..3 {
            let patch = BookingPatch::default().with_email(email(&format!("user{n}@b.co")));
            let Ok(next) = service.update_booking(previous.id, &patch).await else {
                panic!("update {n} failed");
            };
            assert!(next.updated_at > previous.updated_at);
            assert_eq!(next.created_at, created_at);
            previous = next;
        }
    }

    #[tokio::test]
    async fn no_op_update_returns_stored_booking() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        let Ok(created) = service
            .create_booking(NewBooking::new(event_id, email("a@b.co")))
            .await
        else {
            panic!("booking creation failed");
        };

        let patch = BookingPatch::default().with_event_id(event_id);
        let Ok(same) = service.update_booking(created.id, &patch).await else {
            panic!("no-op update failed");
        };
        assert_eq!(same, created);
    }

    #[tokio::test]
    async fn concurrent_write_is_a_conflict_and_not_overwritten() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        let Ok(created) = service
            .create_booking(NewBooking::new(event_id, email("a@b.co")))
            .await
        else {
            panic!("booking creation failed");
        };

        connector.store().interleave_next_update();
        let patch = BookingPatch::default().with_email(email("late@b.co"));
        let result = service.update_booking(created.id, &patch).await;
        assert!(matches!(result, Err(AppError::BookingConflict(id)) if id == created.id));

        let Ok(stored) = service.get_booking(created.id).await else {
            panic!("booking should still exist");
        };
        assert_eq!(stored.email.as_str(), "a@b.co");
        assert!(stored.updated_at > created.updated_at);

        let Ok(retried) = service.update_booking(created.id, &patch).await else {
            panic!("retry against the fresh version should succeed");
        };
        assert_eq!(retried.email.as_str(), "late@b.co");
        assert!(retried.updated_at > stored.updated_at);
    }

    #[tokio::test]
    async fn update_unknown_booking_is_not_found() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let patch = BookingPatch::default().with_email(email("a@b.co"));
        let result = service.update_booking(BookingId::new(), &patch).await;
        assert!(matches!(result, Err(AppError::BookingNotFound(_))));
    }

    #[tokio::test]
    async fn lookups_by_event_and_email() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        let event_id = seed_event(&service).await;
        let other_event = seed_event(&service).await;
        for (event, addr) in [
            (event_id, "a@b.co"),
            (event_id, "c@d.co"),
            (other_event, "a@b.co"),
        ] {
            let Ok(_) = service.create_booking(NewBooking::new(event, email(addr))).await else {
                panic!("booking creation failed");
            };
        }

        let Ok(for_event) = service.bookings_for_event(event_id).await else {
            panic!("listing failed");
        };
        assert_eq!(for_event.len(), 2);

        let Ok(found) = service.find_booking(event_id, &email("C@D.co")).await else {
            panic!("lookup failed");
        };
        assert!(found.is_some_and(|b| b.email.as_str() == "c@d.co"));

        let Ok(missing) = service.find_booking(event_id, &email("x@y.co")).await else {
            panic!("lookup failed");
        };
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn list_events_pages_and_counts() {
        let connector = MemoryConnector::new();
        let service = make_service(&connector);
        for _ in 0..3 {
            seed_event(&service).await;
        }
        let Ok(page) = service.list_events(2, 2).await else {
            panic!("listing failed");
        };
        assert_eq!(page.events.len(), 1);
        assert_eq!(page.total, 3);
    }

    #[tokio::test]
    async fn connection_failure_surfaces_and_heals() {
        let connector = MemoryConnector::new().failing(1);
        let service = make_service(&connector);

        let result = service.get_booking(BookingId::new()).await;
        assert!(matches!(
            result,
            Err(AppError::Connection(ConnectionError::Connect(_)))
        ));

        let result = service.get_booking(BookingId::new()).await;
        assert!(matches!(result, Err(AppError::BookingNotFound(_))));
        assert_eq!(connector.attempts(), 2);
    }
}
