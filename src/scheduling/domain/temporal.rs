//! Pure wall-clock classification of scheduled work.

use super::AppointmentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency class of an appointment relative to a wall-clock instant.
///
/// Derived on every read and never persisted; a stored copy would go stale
/// the moment the clock moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalClass {
    /// Scheduled for a later day, or already resolved to an outcome.
    Upcoming,
    /// Scheduled for today at or after the given instant.
    DueToday,
    /// Still scheduled with its instant strictly in the past.
    Overdue,
}

impl TemporalClass {
    /// Returns the canonical display representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::DueToday => "due_today",
            Self::Overdue => "overdue",
        }
    }
}

impl fmt::Display for TemporalClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies an appointment's urgency at the given instant.
///
/// Only `Scheduled` appointments can be urgent: resolved appointments are
/// always `Upcoming` regardless of date. An appointment scheduled exactly
/// at `now` is `DueToday`, not `Overdue`; the tie goes to the non-urgent
/// class so a poll landing on the boundary does not flicker.
#[must_use]
pub fn classify(
    status: AppointmentStatus,
    scheduled_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> TemporalClass {
    if status != AppointmentStatus::Scheduled {
        return TemporalClass::Upcoming;
    }
    if scheduled_at < now {
        return TemporalClass::Overdue;
    }
    if scheduled_at.date_naive() == now.date_naive() {
        TemporalClass::DueToday
    } else {
        TemporalClass::Upcoming
    }
}
