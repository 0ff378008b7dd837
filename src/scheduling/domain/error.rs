//! Error types for scheduling domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing scheduling domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchedulingDomainError {
    /// The appointment title is empty after trimming.
    #[error("appointment title must not be empty")]
    EmptyTitle,

    /// The appointment title exceeds the accepted length.
    #[error("appointment title is {length} characters, limit is {limit}")]
    TitleTooLong {
        /// Actual character count.
        length: usize,
        /// Accepted maximum.
        limit: usize,
    },
}

/// Error returned while parsing appointment statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown appointment status: {0}")]
pub struct ParseAppointmentStatusError(pub String);
