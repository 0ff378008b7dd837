//! Pipeline status and scheduling mirror enumerations.

use super::{ParsePipelineStatusError, ParseSchedulingMirrorError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Sales-pipeline stage of a client.
///
/// `Pending` exists only before a broker is assigned (public intake). The
/// other nine stages form the working pipeline; cards move freely between
/// them on the kanban board, subject only to the access policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// Public intake awaiting broker assignment.
    Pending,
    /// Freshly assigned client, no work started.
    New,
    /// Broker is actively servicing the client.
    InService,
    /// Client paperwork is under document review.
    DocumentReview,
    /// Application is with the bank.
    BankReview,
    /// Financing approved.
    Approved,
    /// Financing approved with conditions.
    Conditioned,
    /// Financing rejected.
    Rejected,
    /// Sale closed successfully.
    SaleCompleted,
    /// Deal rescinded after closing.
    Rescinded,
}

impl PipelineStatus {
    /// All ten statuses, intake first.
    pub const ALL: [Self; 10] = [
        Self::Pending,
        Self::New,
        Self::InService,
        Self::DocumentReview,
        Self::BankReview,
        Self::Approved,
        Self::Conditioned,
        Self::Rejected,
        Self::SaleCompleted,
        Self::Rescinded,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::New => "new",
            Self::InService => "in_service",
            Self::DocumentReview => "document_review",
            Self::BankReview => "bank_review",
            Self::Approved => "approved",
            Self::Conditioned => "conditioned",
            Self::Rejected => "rejected",
            Self::SaleCompleted => "sale_completed",
            Self::Rescinded => "rescinded",
        }
    }

    /// Returns whether this is the intake-only status.
    #[must_use]
    pub const fn is_intake(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Returns whether this stage is reserved for back-office review.
    /// Brokers may not move a client out of a locked stage.
    #[must_use]
    pub const fn is_review_locked(self) -> bool {
        matches!(
            self,
            Self::BankReview | Self::Approved | Self::Conditioned | Self::Rejected
        )
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PipelineStatus {
    type Error = ParsePipelineStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "new" => Ok(Self::New),
            "in_service" => Ok(Self::InService),
            "document_review" => Ok(Self::DocumentReview),
            "bank_review" => Ok(Self::BankReview),
            "approved" => Ok(Self::Approved),
            "conditioned" => Ok(Self::Conditioned),
            "rejected" => Ok(Self::Rejected),
            "sale_completed" => Ok(Self::SaleCompleted),
            "rescinded" => Ok(Self::Rescinded),
            _ => Err(ParsePipelineStatusError(value.to_owned())),
        }
    }
}

/// Denormalized mirror of the client's most recent appointment status.
///
/// Kept on the client record so list screens avoid a join; the scheduling
/// coordinator is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulingMirror {
    /// The latest appointment is still scheduled.
    Awaiting,
    /// The latest appointment completed.
    Completed,
    /// The latest appointment was closed without completing.
    NotCompleted,
}

impl SchedulingMirror {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Awaiting => "awaiting",
            Self::Completed => "completed",
            Self::NotCompleted => "not_completed",
        }
    }
}

impl fmt::Display for SchedulingMirror {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SchedulingMirror {
    type Error = ParseSchedulingMirrorError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "awaiting" => Ok(Self::Awaiting),
            "completed" => Ok(Self::Completed),
            "not_completed" => Ok(Self::NotCompleted),
            _ => Err(ParseSchedulingMirrorError(value.to_owned())),
        }
    }
}
