//! Unit tests for the scheduling context.

mod coordinator_tests;
mod domain_tests;

use chrono::{DateTime, Utc};

/// Parses an RFC 3339 instant for test fixtures.
pub(crate) fn at(value: &str) -> eyre::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
