//! Error types with HTTP status code mapping.
//!
//! Each concern has its own error enum ([`ConfigError`],
//! [`ConnectionError`], [`ValidationError`], [`ReferenceError`],
//! [`StoreError`]). [`AppError`] is the central type returned by the
//! service layer and handlers; every variant maps to a specific HTTP status
//! code and structured JSON error response.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{BookingId, EventId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "email: Please provide a valid email address",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see [`AppError`] code ranges).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Startup configuration failure. Fatal: the process cannot proceed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The database connection string is absent or blank.
    #[error("DATABASE_URL must be set (e.g. in .env)")]
    MissingDatabaseUrl,

    /// A configuration value is present but malformed.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// Parser message.
        reason: String,
    },
}

/// A database connection attempt failed.
///
/// Cloneable so every caller awaiting the same in-flight attempt receives
/// the same failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectionError {
    /// The driver rejected the connection.
    #[error("failed to connect to database: {0}")]
    Connect(String),

    /// The attempt did not complete within the connect timeout.
    #[error("timed out after {0:?} connecting to database")]
    Timeout(Duration),
}

/// A field failed its presence or format rule.
///
/// Raised before any I/O is attempted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Name of the offending field as it appears on the wire.
    pub field: &'static str,
    /// Rule that was violated.
    pub message: &'static str,
}

impl ValidationError {
    /// Creates a validation error for `field`.
    #[must_use]
    pub const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

/// A storage operation failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The database reported an error.
    #[error("query failed: {0}")]
    Query(String),

    /// The query did not finish within the query timeout.
    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    /// A stored row could not be turned back into a domain value.
    #[error("corrupt row: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Query(err.to_string())
    }
}

/// The booking's event reference could not be confirmed.
///
/// Both variants abort persistence. They are kept apart because a failed
/// lookup is transient while a missing event is permanent.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    /// No event with this identifier exists.
    #[error("Referenced event does not exist")]
    EventNotFound(EventId),

    /// The existence query itself failed.
    #[error("Error validating event reference")]
    LookupFailed {
        /// Event that was being looked up.
        event_id: EventId,
        /// Underlying storage failure.
        #[source]
        source: StoreError,
    },
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category              | HTTP Status                  |
/// |-----------|-----------------------|------------------------------|
/// | 1000–1999 | Validation            | 400 Bad Request              |
/// | 2000–2999 | Not Found / Integrity | 404 / 409 / 422              |
/// | 3000–3999 | Server / Storage      | 500 / 503                    |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No database connection could be established.
    #[error("{0}")]
    Connection(#[from] ConnectionError),

    /// A request field failed validation.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The referenced event is missing or could not be checked.
    #[error("{0}")]
    Reference(#[from] ReferenceError),

    /// Storage layer failure.
    #[error("persistence error: {0}")]
    Persistence(#[from] StoreError),

    /// Booking with the given ID was not found.
    #[error("booking not found: {0}")]
    BookingNotFound(BookingId),

    /// The booking was changed by another request after it was read.
    #[error("booking was modified concurrently: {0}")]
    BookingConflict(BookingId),

    /// Malformed path or query input.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::Validation(_) => 1001,
            Self::InvalidRequest(_) => 1002,
            Self::BookingNotFound(_) => 2001,
            Self::Reference(ReferenceError::EventNotFound(_)) => 2002,
            Self::BookingConflict(_) => 2003,
            Self::Persistence(_) => 3001,
            Self::Connection(_) => 3002,
            Self::Reference(ReferenceError::LookupFailed { .. }) => 3003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::BookingNotFound(_) => StatusCode::NOT_FOUND,
            Self::BookingConflict(_) => StatusCode::CONFLICT,
            Self::Reference(ReferenceError::EventNotFound(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Connection(_) | Self::Reference(ReferenceError::LookupFailed { .. }) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            Self::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            Self::Validation(err) => Some(err.field.to_string()),
            Self::Reference(ReferenceError::EventNotFound(event_id)) => Some(event_id.to_string()),
            Self::Reference(ReferenceError::LookupFailed { source, .. }) => {
                Some(source.to_string())
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: self.details(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
