//! Repository port for appointment persistence and time-window queries.

use crate::access::BrokerScope;
use crate::client::domain::ClientId;
use crate::scheduling::domain::{Appointment, AppointmentId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for appointment repository operations.
pub type AppointmentRepositoryResult<T> = Result<T, AppointmentRepositoryError>;

/// Appointment persistence contract.
///
/// The time-window queries return `Scheduled` appointments only, ascending
/// by scheduled instant; resolved appointments never appear in urgency
/// views.
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Stores a new appointment.
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentRepositoryError::DuplicateAppointment`] when the
    /// appointment ID already exists.
    async fn store(&self, appointment: &Appointment) -> AppointmentRepositoryResult<()>;

    /// Persists changes to an existing appointment (status, instant,
    /// timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`AppointmentRepositoryError::NotFound`] when the appointment
    /// does not exist.
    async fn update(&self, appointment: &Appointment) -> AppointmentRepositoryResult<()>;

    /// Finds an appointment by identifier.
    ///
    /// Returns `None` when the appointment does not exist.
    async fn find_by_id(
        &self,
        id: AppointmentId,
    ) -> AppointmentRepositoryResult<Option<Appointment>>;

    /// Removes every appointment belonging to the client, returning how
    /// many rows were removed. Part of the client delete cascade; still
    /// `Scheduled` appointments are removed like any other.
    async fn delete_by_client(&self, client_id: ClientId) -> AppointmentRepositoryResult<u64>;

    /// Returns `Scheduled` appointments with an instant strictly before
    /// `instant`, ascending by scheduled instant.
    async fn list_scheduled_before(
        &self,
        instant: DateTime<Utc>,
        scope: BrokerScope,
    ) -> AppointmentRepositoryResult<Vec<Appointment>>;

    /// Returns `Scheduled` appointments with an instant in `[from, until]`,
    /// ascending by scheduled instant.
    async fn list_scheduled_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        scope: BrokerScope,
    ) -> AppointmentRepositoryResult<Vec<Appointment>>;
}

/// Errors returned by appointment repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AppointmentRepositoryError {
    /// An appointment with the same identifier already exists.
    #[error("duplicate appointment identifier: {0}")]
    DuplicateAppointment(AppointmentId),

    /// The appointment was not found.
    #[error("appointment not found: {0}")]
    NotFound(AppointmentId),

    /// Gateway-level timeout or connectivity failure; safe to retry for
    /// pure reads.
    #[error("transient gateway failure: {0}")]
    Transient(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AppointmentRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a transient gateway error.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Arc::new(err))
    }

    /// Returns whether the error is a transient gateway failure.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}
