//! Email value object.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::constants::EMAIL_MAX_LENGTH;
use crate::error::{DomainError, DomainResult, FormatField};

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9]([a-zA-Z0-9._+-]*[a-zA-Z0-9])?@[a-zA-Z0-9]([a-zA-Z0-9.-]*[a-zA-Z0-9])?\.[a-zA-Z]{2,}$",
    )
    .expect("email pattern is a valid regex")
});

/// E-mail address, normalized to lowercase without surrounding whitespace.
///
/// ```
/// use domain::Email;
///
/// let email = Email::parse("  User@Example.COM ").unwrap();
/// assert_eq!(email.as_str(), "user@example.com");
/// assert_eq!(email.domain(), "example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    /// Normalize and validate an e-mail address.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidFormat(FormatField::Email)` for empty
    /// input, addresses over 254 characters, consecutive dots, a dot next to
    /// the `@`, or anything outside the accepted grammar.
    pub fn parse(raw: &str) -> DomainResult<Self> {
        if raw.is_empty() {
            return Err(Self::invalid());
        }

        let normalized = raw.to_lowercase().trim().to_string();

        if normalized.len() > EMAIL_MAX_LENGTH
            || normalized.contains("..")
            || normalized.contains("@.")
            || normalized.contains(".@")
            || !EMAIL_PATTERN.is_match(&normalized)
        {
            return Err(Self::invalid());
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Part after the `@`.
    pub fn domain(&self) -> &str {
        self.split().1
    }

    /// Part before the `@`.
    pub fn local_part(&self) -> &str {
        self.split().0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    // The grammar admits exactly one '@'.
    fn split(&self) -> (&str, &str) {
        self.0.split_once('@').unwrap_or((self.0.as_str(), ""))
    }

    fn invalid() -> DomainError {
        DomainError::InvalidFormat(FormatField::Email)
    }
}

impl Serialize for Email {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Email::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
