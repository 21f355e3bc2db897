//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::PgConnector;
use crate::service::BookingService;

/// Booking service backed by PostgreSQL.
pub type PgBookingService = BookingService<PgConnector>;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Booking service for all business logic.
    pub bookings: Arc<PgBookingService>,
}
