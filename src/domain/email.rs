//! Normalized email address.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::ValidationError;

/// Field name used in validation errors.
pub const EMAIL_FIELD: &str = "email";

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

#[allow(clippy::expect_used)]
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"));

/// An email address that has been trimmed, lower-cased, and checked against
/// the `local@domain.tld` pattern.
///
/// The only way to obtain one is [`Email::parse`], so holding an `Email`
/// means the value is valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Normalizes and validates a raw address.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on the `email` field when the trimmed
    /// value is empty or does not match the pattern.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::new(EMAIL_FIELD, "Email is required"));
        }
        if !EMAIL_RE.is_match(&normalized) {
            return Err(ValidationError::new(
                EMAIL_FIELD,
                "Please provide a valid email address",
            ));
        }
        Ok(Self(normalized))
    }

    /// Validates a JSON value that should hold an address.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the value is absent, `null`, not a
    /// string, or fails [`Email::parse`].
    pub fn from_json(value: Option<&serde_json::Value>) -> Result<Self, ValidationError> {
        match value {
            None | Some(serde_json::Value::Null) => {
                Err(ValidationError::new(EMAIL_FIELD, "Email is required"))
            }
            Some(serde_json::Value::String(s)) => Self::parse(s),
            Some(_) => Err(ValidationError::new(EMAIL_FIELD, "Email must be a string")),
        }
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
