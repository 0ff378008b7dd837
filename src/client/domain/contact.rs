//! Validated value objects carried on the client record.

use super::ClientDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contact details captured at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContact {
    full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl ClientContact {
    /// Creates contact details with a required full name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientDomainError::EmptyFullName`] when the name is empty
    /// after trimming.
    pub fn new(full_name: impl Into<String>) -> Result<Self, ClientDomainError> {
        let raw = full_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientDomainError::EmptyFullName);
        }
        Ok(Self {
            full_name: trimmed.to_owned(),
            phone: None,
            email: None,
        })
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the phone number, if captured.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the email address, if captured.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

/// Acquisition channel of a client (site, referral, walk-in, ...).
///
/// Reporting-only; the engine never mutates it after intake.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadOrigin(String);

impl LeadOrigin {
    /// Longest accepted origin label.
    pub const MAX_LEN: usize = 120;

    /// Creates a validated acquisition channel label.
    ///
    /// # Errors
    ///
    /// Returns [`ClientDomainError::EmptyLeadOrigin`] when the value is
    /// empty after trimming, or [`ClientDomainError::LeadOriginTooLong`]
    /// when it exceeds [`Self::MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, ClientDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ClientDomainError::EmptyLeadOrigin);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LEN {
            return Err(ClientDomainError::LeadOriginTooLong {
                length,
                limit: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the origin label as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LeadOrigin {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for LeadOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
