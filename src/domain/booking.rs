//! Booking records: unvalidated input, validated drafts, persisted rows.
//!
//! A booking moves through three shapes:
//!
//! 1. raw JSON fields from a request,
//! 2. a [`NewBooking`] (or [`BookingPatch`]) that only exists if every field
//!    rule passed,
//! 3. a stamped [`Booking`] carrying its identifier and timestamps.
//!
//! The referential check on `eventId` is not done here; see
//! [`super::validation`] for the pre-save pipeline.

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use serde::Serialize;

use super::{BookingId, Email, EventId};
use crate::error::ValidationError;

/// Field name used in validation errors.
pub const EVENT_ID_FIELD: &str = "eventId";

/// Validates a JSON value that should hold an event identifier.
///
/// # Errors
///
/// Returns a [`ValidationError`] on the `eventId` field when the value is
/// absent, `null`, not a string, or not a UUID.
pub fn parse_event_id(value: Option<&serde_json::Value>) -> Result<EventId, ValidationError> {
    match value {
        None | Some(serde_json::Value::Null) => {
            Err(ValidationError::new(EVENT_ID_FIELD, "Event ID is required"))
        }
        Some(serde_json::Value::String(s)) => s
            .parse()
            .map_err(|_| ValidationError::new(EVENT_ID_FIELD, "Event ID is invalid")),
        Some(_) => Err(ValidationError::new(EVENT_ID_FIELD, "Event ID is invalid")),
    }
}

/// A booking whose fields have all passed validation but which has not been
/// stamped or persisted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBooking {
    event_id: EventId,
    email: Email,
}

impl NewBooking {
    /// Builds a draft from already-typed fields.
    #[must_use]
    pub const fn new(event_id: EventId, email: Email) -> Self {
        Self { event_id, email }
    }

    /// Builds a draft from raw request fields.
    ///
    /// `eventId` is checked first, then `email`; the first failing rule is
    /// reported.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first invalid field.
    pub fn parse(
        event_id: Option<&serde_json::Value>,
        email: Option<&serde_json::Value>,
    ) -> Result<Self, ValidationError> {
        let event_id = parse_event_id(event_id)?;
        let email = Email::from_json(email)?;
        Ok(Self { event_id, email })
    }

    /// Referenced event.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Normalized email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

/// A validated partial update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingPatch {
    event_id: Option<EventId>,
    email: Option<Email>,
}

impl BookingPatch {
    /// Builds a patch from raw request fields.
    ///
    /// A field that is absent from the request stays `None`. A field that is
    /// present must pass the same rule as on creation, so an explicit `null`
    /// is rejected rather than clearing the field.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] naming the first invalid field.
    pub fn parse(
        event_id: Option<&serde_json::Value>,
        email: Option<&serde_json::Value>,
    ) -> Result<Self, ValidationError> {
        let event_id = event_id.map(|v| parse_event_id(Some(v))).transpose()?;
        let email = email.map(|v| Email::from_json(Some(v))).transpose()?;
        Ok(Self { event_id, email })
    }

    /// Sets the new event reference.
    #[must_use]
    pub fn with_event_id(mut self, event_id: EventId) -> Self {
        self.event_id = Some(event_id);
        self
    }

    /// Sets the new email.
    #[must_use]
    pub fn with_email(mut self, email: Email) -> Self {
        self.email = Some(email);
        self
    }

    /// Returns `true` when the patch names no field at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.event_id.is_none() && self.email.is_none()
    }
}

/// A persisted (or about to be persisted) booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique booking identifier (immutable after creation).
    pub id: BookingId,
    /// Referenced event.
    pub event_id: EventId,
    /// Normalized email address.
    pub email: Email,
    /// Creation timestamp (immutable after creation).
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Stamps a draft with a fresh identifier and equal creation and update
    /// timestamps.
    #[must_use]
    pub fn stamp(draft: NewBooking, now: DateTime<Utc>) -> Self {
        let now = now.trunc_subsecs(6);
        Self {
            id: BookingId::new(),
            event_id: draft.event_id,
            email: draft.email,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies `patch`, returning the updated record.
    ///
    /// Returns `None` when the patch would not change any field, in which
    /// case nothing needs to be written and `updated_at` is left alone.
    #[must_use]
    pub fn apply(&self, patch: &BookingPatch, now: DateTime<Utc>) -> Option<BookingUpdate> {
        let event_id_changed = patch.event_id.is_some_and(|id| id != self.event_id);
        let email_changed = patch.email.as_ref().is_some_and(|e| *e != self.email);
        if !event_id_changed && !email_changed {
            return None;
        }

        let mut next = self.clone();
        if let Some(event_id) = patch.event_id {
            next.event_id = event_id;
        }
        if let Some(email) = &patch.email {
            next.email = email.clone();
        }
        next.updated_at = next_updated_at(self.updated_at, now);

        Some(BookingUpdate {
            booking: next,
            event_id_changed,
        })
    }
}

/// Result of applying a [`BookingPatch`] to a stored [`Booking`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingUpdate {
    /// The record as it should be written.
    pub booking: Booking,
    /// Whether the event reference differs from the stored one.
    pub event_id_changed: bool,
}

/// Computes the next `updated_at` so that it is strictly greater than
/// `previous`, at the microsecond precision the database stores.
#[must_use]
pub fn next_updated_at(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    if now > previous {
        now
    } else {
        previous + TimeDelta::microseconds(1)
    }
}
