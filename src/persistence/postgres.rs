//! PostgreSQL implementation of the persistence layer.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::models::{
    BOOKING_COLUMNS, BookingRow, EVENT_COLUMNS, EventRow, booking_from_row, event_from_row,
};
use super::{BookingStore, Connector, EventStore};
use crate::domain::{Booking, BookingId, Email, Event, EventId};
use crate::error::{ConnectionError, StoreError};

/// Tables and indexes, declared idempotently on first connection.
///
/// `bookings.event_id` has no foreign key; the pre-save pipeline checks the
/// reference when it is new or changed.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS events (\
        id UUID PRIMARY KEY, \
        title TEXT NOT NULL, \
        slug TEXT NOT NULL, \
        location TEXT NOT NULL, \
        starts_at TIMESTAMPTZ NOT NULL, \
        created_at TIMESTAMPTZ NOT NULL DEFAULT now())",
    "CREATE TABLE IF NOT EXISTS bookings (\
        id UUID PRIMARY KEY, \
        event_id UUID NOT NULL, \
        email TEXT NOT NULL, \
        created_at TIMESTAMPTZ NOT NULL, \
        updated_at TIMESTAMPTZ NOT NULL)",
    "CREATE INDEX IF NOT EXISTS bookings_event_id_idx ON bookings (event_id)",
    "CREATE INDEX IF NOT EXISTS bookings_event_id_email_idx ON bookings (event_id, email)",
];

/// Opens an eager `PgPool` and wraps it in a [`PostgresStore`].
#[derive(Clone)]
pub struct PgConnector {
    database_url: String,
    max_connections: u32,
    min_connections: u32,
    acquire_timeout: Duration,
}

impl PgConnector {
    /// Creates a connector for the given connection string and pool limits.
    #[must_use]
    pub fn new(
        database_url: String,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
    ) -> Self {
        Self {
            database_url,
            max_connections,
            min_connections,
            acquire_timeout,
        }
    }
}

impl fmt::Debug for PgConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The connection string may carry credentials.
        f.debug_struct("PgConnector")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish_non_exhaustive()
    }
}

impl Connector for PgConnector {
    type Handle = PostgresStore;

    fn connect(&self) -> BoxFuture<'static, Result<PostgresStore, ConnectionError>> {
        let options = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.acquire_timeout);
        let url = self.database_url.clone();
        async move {
            // Eager: the handle exists only after the server answered.
            let pool = options
                .connect(&url)
                .await
                .map_err(|e| ConnectionError::Connect(e.to_string()))?;
            let store = PostgresStore::new(pool);
            store
                .ensure_schema()
                .await
                .map_err(|e| ConnectionError::Connect(e.to_string()))?;
            Ok(store)
        }
        .boxed()
    }
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the tables and indexes if they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Query`] on database failure.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

impl EventStore for PostgresStore {
    async fn event_exists(&self, id: EventId) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(*id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO events (id, title, slug, location, starts_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.slug)
        .bind(&event.location)
        .bind(event.starts_at)
        .bind(event.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_events(&self, limit: u32, offset: u32) -> Result<Vec<Event>, StoreError> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY starts_at ASC, id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(event_from_row).collect())
    }

    async fn count_events(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}

impl BookingStore for PostgresStore {
    async fn insert_booking(&self, booking: &Booking) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO bookings (id, event_id, email, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*booking.id.as_uuid())
        .bind(*booking.event_id.as_uuid())
        .bind(booking.email.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_booking(
        &self,
        booking: &Booking,
        expected_updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE bookings SET event_id = $2, email = $3, updated_at = $4 \
             WHERE id = $1 AND updated_at = $5",
        )
        .bind(*booking.id.as_uuid())
        .bind(*booking.event_id.as_uuid())
        .bind(booking.email.as_str())
        .bind(booking.updated_at)
        .bind(expected_updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_booking(&self, id: BookingId) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(booking_from_row).transpose()
    }

    async fn bookings_for_event(&self, event_id: EventId) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 ORDER BY created_at DESC"
        ))
        .bind(*event_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(booking_from_row).collect()
    }

    async fn find_booking_by_email(
        &self,
        event_id: EventId,
        email: &Email,
    ) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE event_id = $1 AND email = $2 \
             ORDER BY created_at ASC LIMIT 1"
        ))
        .bind(*event_id.as_uuid())
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(booking_from_row).transpose()
    }
}
