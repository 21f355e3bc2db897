//! Event records referenced by bookings.
//!
//! Only the fields needed for the featured-events listing are modelled.

use chrono::{DateTime, SubsecRound, Utc};
use serde::Serialize;

use super::EventId;
use crate::error::ValidationError;

const MAX_TITLE_LEN: usize = 200;
const MAX_SLUG_LEN: usize = 80;

/// A stored event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique event identifier.
    pub id: EventId,
    /// Display title.
    pub title: String,
    /// URL-friendly form of the title.
    pub slug: String,
    /// Venue or city.
    pub location: String,
    /// When the event begins.
    pub starts_at: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A validated event that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEvent {
    title: String,
    location: String,
    starts_at: DateTime<Utc>,
}

impl NewEvent {
    /// Validates raw event fields.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the title or location is blank, or
    /// the title is longer than 200 characters.
    pub fn parse(
        title: &str,
        location: &str,
        starts_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::new("title", "Title is required"));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(ValidationError::new(
                "title",
                "Title must be at most 200 characters",
            ));
        }
        let location = location.trim();
        if location.is_empty() {
            return Err(ValidationError::new("location", "Location is required"));
        }
        Ok(Self {
            title: title.to_string(),
            location: location.to_string(),
            starts_at,
        })
    }

    /// Assigns an identifier, slug and creation time.
    #[must_use]
    pub fn stamp(self, now: DateTime<Utc>) -> Event {
        Event {
            id: EventId::new(),
            slug: slugify(&self.title),
            title: self.title,
            location: self.location,
            starts_at: self.starts_at.trunc_subsecs(6),
            created_at: now.trunc_subsecs(6),
        }
    }
}

/// Lower-cases ASCII alphanumerics and joins runs of everything else with a
/// single dash. Non-ASCII characters are dropped.
#[must_use]
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_was_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if ch.is_ascii() && !slug.is_empty() && !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }

    if slug.len() > MAX_SLUG_LEN {
        slug.truncate(MAX_SLUG_LEN);
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}
