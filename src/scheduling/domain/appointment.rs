//! Appointment aggregate root and lifecycle types.

use super::{
    classify, ParseAppointmentStatusError, SchedulingDomainError, TemporalClass, AppointmentId,
};
use crate::access::StaffId;
use crate::client::domain::{ClientId, SchedulingMirror};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Work is planned and not yet resolved.
    Scheduled,
    /// Work completed.
    Completed,
    /// Work was closed without completing.
    NotCompleted,
}

impl AppointmentStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::NotCompleted => "not_completed",
        }
    }

    /// Returns the value mirrored onto the owning client record.
    #[must_use]
    pub const fn as_mirror(self) -> SchedulingMirror {
        match self {
            Self::Scheduled => SchedulingMirror::Awaiting,
            Self::Completed => SchedulingMirror::Completed,
            Self::NotCompleted => SchedulingMirror::NotCompleted,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AppointmentStatus {
    type Error = ParseAppointmentStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "completed" => Ok(Self::Completed),
            "not_completed" => Ok(Self::NotCompleted),
            _ => Err(ParseAppointmentStatusError(value.to_owned())),
        }
    }
}

/// Resolution recorded on a scheduled appointment.
///
/// The status-update operation accepts only an outcome, so moving an
/// appointment back to `Scheduled` is impossible there; rescheduling is the
/// single path back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentOutcome {
    /// The appointment completed.
    Completed,
    /// The appointment was closed without completing.
    NotCompleted,
}

impl AppointmentOutcome {
    /// Returns the lifecycle status this outcome resolves to.
    #[must_use]
    pub const fn status(self) -> AppointmentStatus {
        match self {
            Self::Completed => AppointmentStatus::Completed,
            Self::NotCompleted => AppointmentStatus::NotCompleted,
        }
    }
}

/// Validated appointment title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentTitle(String);

impl AppointmentTitle {
    /// Longest accepted title.
    pub const MAX_LEN: usize = 160;

    /// Creates a validated title.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingDomainError::EmptyTitle`] when the value is
    /// empty after trimming, or [`SchedulingDomainError::TitleTooLong`]
    /// when it exceeds [`Self::MAX_LEN`] characters.
    pub fn new(value: impl Into<String>) -> Result<Self, SchedulingDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SchedulingDomainError::EmptyTitle);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LEN {
            return Err(SchedulingDomainError::TitleTooLong {
                length,
                limit: Self::MAX_LEN,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AppointmentTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AppointmentTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Appointment aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    id: AppointmentId,
    client_id: Option<ClientId>,
    broker_id: StaffId,
    scheduled_at: DateTime<Utc>,
    status: AppointmentStatus,
    title: AppointmentTitle,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted appointment aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAppointmentData {
    /// Persisted appointment identifier.
    pub id: AppointmentId,
    /// Persisted owning client, absent for administrative tasks.
    pub client_id: Option<ClientId>,
    /// Persisted broker assignment.
    pub broker_id: StaffId,
    /// Persisted scheduled instant.
    pub scheduled_at: DateTime<Utc>,
    /// Persisted lifecycle status.
    pub status: AppointmentStatus,
    /// Persisted title.
    pub title: AppointmentTitle,
    /// Persisted description, if any.
    pub description: Option<String>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Schedules a new appointment. The initial status is always
    /// `Scheduled`.
    #[must_use]
    pub fn schedule(
        client_id: Option<ClientId>,
        broker_id: StaffId,
        scheduled_at: DateTime<Utc>,
        title: AppointmentTitle,
        description: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: AppointmentId::new(),
            client_id,
            broker_id,
            scheduled_at,
            status: AppointmentStatus::Scheduled,
            title,
            description,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs an appointment from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAppointmentData) -> Self {
        Self {
            id: data.id,
            client_id: data.client_id,
            broker_id: data.broker_id,
            scheduled_at: data.scheduled_at,
            status: data.status,
            title: data.title,
            description: data.description,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the appointment identifier.
    #[must_use]
    pub const fn id(&self) -> AppointmentId {
        self.id
    }

    /// Returns the owning client, absent for administrative tasks.
    #[must_use]
    pub const fn client_id(&self) -> Option<ClientId> {
        self.client_id
    }

    /// Returns the assigned broker.
    #[must_use]
    pub const fn broker_id(&self) -> StaffId {
        self.broker_id
    }

    /// Returns the scheduled instant.
    #[must_use]
    pub const fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> AppointmentStatus {
        self.status
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &AppointmentTitle {
        &self.title
    }

    /// Returns the description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest mutation timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Resolves the appointment to an outcome.
    pub fn record_outcome(&mut self, outcome: AppointmentOutcome, clock: &impl Clock) {
        self.status = outcome.status();
        self.touch(clock);
    }

    /// Moves the appointment to a new instant and back to `Scheduled`.
    /// A resolved appointment cannot be un-marked any other way.
    pub fn reschedule(&mut self, scheduled_at: DateTime<Utc>, clock: &impl Clock) {
        self.scheduled_at = scheduled_at;
        self.status = AppointmentStatus::Scheduled;
        self.touch(clock);
    }

    /// Classifies the appointment's urgency at the given instant.
    #[must_use]
    pub fn classify(&self, now: DateTime<Utc>) -> TemporalClass {
        classify(self.status, self.scheduled_at, now)
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
