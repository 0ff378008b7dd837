//! Error types for client domain validation and transitions.

use super::{ClientId, PipelineStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating client domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientDomainError {
    /// The client's full name is empty after trimming.
    #[error("client full name must not be empty")]
    EmptyFullName,

    /// The acquisition channel label is empty after trimming.
    #[error("lead origin must not be empty")]
    EmptyLeadOrigin,

    /// The acquisition channel label exceeds the accepted length.
    #[error("lead origin is {length} characters, limit is {limit}")]
    LeadOriginTooLong {
        /// Actual character count.
        length: usize,
        /// Accepted maximum.
        limit: usize,
    },

    /// A staff-created client requires a broker assignment.
    #[error("a staff-created client requires a broker")]
    MissingBroker,

    /// The requested pipeline transition is not legal for this client.
    #[error("invalid pipeline transition for client {client_id}: {from} -> {to}")]
    InvalidStatusTransition {
        /// Client the transition was attempted on.
        client_id: ClientId,
        /// Current pipeline status.
        from: PipelineStatus,
        /// Attempted pipeline status.
        to: PipelineStatus,
    },

    /// `Pending` is intake-only and cannot be set through status edits.
    #[error("status 'pending' is intake-only and cannot be set on client {client_id}")]
    IntakeOnlyStatus {
        /// Client the edit was attempted on.
        client_id: ClientId,
    },
}

/// Error returned while parsing pipeline statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown pipeline status: {0}")]
pub struct ParsePipelineStatusError(pub String);

/// Error returned while parsing scheduling mirror values from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown scheduling status: {0}")]
pub struct ParseSchedulingMirrorError(pub String);
