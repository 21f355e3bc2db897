//! In-memory store and counting connector for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::RwLock;

use super::{BookingStore, Connector, EventStore};
use crate::domain::{Booking, BookingId, Email, Event, EventId};
use crate::error::{ConnectionError, StoreError};

#[derive(Debug, Default)]
struct MemoryState {
    events: RwLock<HashMap<EventId, Event>>,
    bookings: RwLock<HashMap<BookingId, Booking>>,
    events_unreachable: AtomicBool,
    interleave_next_update: AtomicBool,
}

/// Cloneable handle over shared in-memory collections.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<MemoryState>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether both handles point at the same collections.
    pub(crate) fn same_store(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// Makes every `events` lookup fail, as if that collection were down.
    pub(crate) fn set_events_unreachable(&self, unreachable: bool) {
        self.state
            .events_unreachable
            .store(unreachable, Ordering::SeqCst);
    }

    /// The next `update_booking` finds the row already rewritten by another
    /// writer.
    pub(crate) fn interleave_next_update(&self) {
        self.state
            .interleave_next_update
            .store(true, Ordering::SeqCst);
    }

    fn check_events_reachable(&self) -> Result<(), StoreError> {
        if self.state.events_unreachable.load(Ordering::SeqCst) {
            return Err(StoreError::Query("events collection unreachable".to_string()));
        }
        Ok(())
    }

    pub(crate) async fn booking_count(&self) -> usize {
        self.state.bookings.read().await.len()
    }
}

impl EventStore for MemoryStore {
    async fn event_exists(&self, id: EventId) -> Result<bool, StoreError> {
        self.check_events_reachable()?;
        Ok(self.state.events.read().await.contains_key(&id))
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        self.check_events_reachable()?;
        self.state
            .events
            .write()
            .await
            .insert(event.id, event.clone());
        Ok(())
    }

    async fn list_events(&self, limit: u32, offset: u32) -> Result<Vec<Event>, StoreError> {
        self.check_events_reachable()?;
        let mut events: Vec<Event> = self.state.events.read().await.values().cloned().collect();
        events.sort_by_key(|e| (e.starts_at, e.id));
        Ok(events
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_events(&self) -> Result<u64, StoreError> {
        self.check_events_reachable()?;
        Ok(self.state.events.read().await.len() as u64)
    }
}

impl BookingStore for MemoryStore {
    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        self.state
            .bookings
            .write()
            .await
            .insert(booking.id, booking.clone());
        Ok(())
    }

    async fn update_booking(
        &self,
        booking: &Booking,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut bookings = self.state.bookings.write().await;
        let Some(existing) = bookings.get_mut(&booking.id) else {
            return Ok(false);
        };
        if self.state.interleave_next_update.swap(false, Ordering::SeqCst) {
            existing.updated_at += TimeDelta::milliseconds(1);
        }
        if existing.updated_at != expected_updated_at {
            return Ok(false);
        }
        existing.event_id = booking.event_id;
        existing.email = booking.email.clone();
        existing.updated_at = booking.updated_at;
        Ok(true)
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        Ok(self.state.bookings.read().await.get(&id).cloned())
    }

    async fn bookings_for_event(&self, event_id: EventId) -> Result<Vec<Booking>, StoreError> {
        let mut found: Vec<Booking> = self
            .state
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn find_booking_by_email(
        &self,
        event_id: EventId,
        email: &Email,
    ) -> Result<Option<Booking>, StoreError> {
        Ok(self
            .state
            .bookings
            .read()
            .await
            .values()
            .find(|b| b.event_id == event_id && b.email == *email)
            .cloned())
    }
}

/// Connector that hands out one [`MemoryStore`] and counts attempts.
#[derive(Debug, Clone)]
pub(crate) struct MemoryConnector {
    store: MemoryStore,
    attempts: Arc<AtomicUsize>,
    failures_left: Arc<AtomicUsize>,
    delay: Duration,
}

impl MemoryConnector {
    pub(crate) fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            attempts: Arc::new(AtomicUsize::new(0)),
            failures_left: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    /// Each attempt sleeps this long before resolving.
    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// The next `n` attempts fail.
    pub(crate) fn failing(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn store(&self) -> MemoryStore {
        self.store.clone()
    }
}

impl Connector for MemoryConnector {
    type Handle = MemoryStore;

    fn connect(&self) -> BoxFuture<'static, Result<MemoryStore, ConnectionError>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let store = self.store.clone();
        let delay = self.delay;
        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if fail {
                return Err(ConnectionError::Connect("connection refused".to_string()));
            }
            Ok(store)
        }
        .boxed()
    }
}
