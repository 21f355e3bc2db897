//! Booking DTOs for create, update, get, and lookup operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::common_dto::present;
use crate::domain::Booking;

/// Request body for `POST /bookings`.
///
/// Fields are kept as raw JSON so that type errors surface as field-level
/// validation errors rather than body rejections.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// Identifier of the event being booked.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String, format = Uuid)]
    pub event_id: Option<serde_json::Value>,
    /// Attendee email address.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = String, example = "jane@example.com")]
    pub email: Option<serde_json::Value>,
}

/// Request body for `PATCH /bookings/{id}`. Absent fields are left as is.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    /// New event identifier.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, format = Uuid)]
    pub event_id: Option<serde_json::Value>,
    /// New attendee email address.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>)]
    pub email: Option<serde_json::Value>,
}

/// A booking as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDto {
    /// Booking identifier.
    pub id: uuid::Uuid,
    /// Referenced event.
    pub event_id: uuid::Uuid,
    /// Normalized email address.
    pub email: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingDto {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.into(),
            event_id: booking.event_id.into(),
            email: booking.email.as_str().to_string(),
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// Response body for `GET /events/{id}/bookings`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    /// Bookings for the event, newest first.
    pub data: Vec<BookingDto>,
}

/// Query parameters for `GET /events/{id}/bookings/lookup`.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookingLookupQuery {
    /// Email to look up; normalized before matching.
    pub email: String,
}

/// Response body for `GET /events/{id}/bookings/lookup`.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingLookupResponse {
    /// Whether this email has booked the event.
    pub booked: bool,
    /// The matching booking, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub booking: Option<BookingDto>,
}
