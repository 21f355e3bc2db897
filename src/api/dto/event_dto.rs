//! Event DTOs for create and list operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::common_dto::PaginationMeta;
use crate::domain::Event;

/// Request body for `POST /events`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    /// Display title (max 200 chars).
    pub title: String,
    /// Venue or city.
    pub location: String,
    /// Start time (RFC 3339).
    pub starts_at: DateTime<Utc>,
}

/// An event as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Event identifier.
    pub id: uuid::Uuid,
    /// Display title.
    pub title: String,
    /// URL-friendly title.
    pub slug: String,
    /// Venue or city.
    pub location: String,
    /// Start time.
    pub starts_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventDto {
    fn from(event: Event) -> Self {
        Self {
            id: event.id.into(),
            title: event.title,
            slug: event.slug,
            location: event.location,
            starts_at: event.starts_at,
            created_at: event.created_at,
        }
    }
}

/// Paginated list response for `GET /events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct EventListResponse {
    /// Events ordered by start time.
    pub data: Vec<EventDto>,
    /// Pagination metadata.
    pub pagination: PaginationMeta,
}
