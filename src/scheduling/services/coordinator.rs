//! Service layer coordinating appointments with the client mirror.
//!
//! Every appointment mutation is two writes: the appointment row and the
//! owning client's denormalized scheduling status. The backing store offers
//! no cross-row atomicity, so the coordinator sequences the writes, retries
//! the mirror once, and surfaces [`PartialSyncError`] when the mirror still
//! fails. The committed appointment write is the source of truth;
//! [`SchedulingCoordinator::resync_client_mirror`] re-issues the mirror
//! step alone.

use crate::access::{
    Actor, BrokerScope, StaffId,
    policy::{ensure_actor_scope, ensure_can_update_appointment_status},
    AccessError,
};
use crate::client::{
    domain::{ClientId, SchedulingMirror},
    ports::{ClientRepository, ClientRepositoryError},
};
use crate::scheduling::{
    domain::{
        Appointment, AppointmentId, AppointmentOutcome, AppointmentTitle, SchedulingDomainError,
    },
    ports::{AppointmentRepository, AppointmentRepositoryError},
};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for scheduling a new appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAppointmentRequest {
    client_id: Option<ClientId>,
    broker_id: StaffId,
    scheduled_at: DateTime<Utc>,
    title: String,
    description: Option<String>,
}

impl CreateAppointmentRequest {
    /// Creates a request with the required fields. Without a client the
    /// appointment is an administrative task and no mirror applies.
    #[must_use]
    pub fn new(
        broker_id: StaffId,
        scheduled_at: DateTime<Utc>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            client_id: None,
            broker_id,
            scheduled_at,
            title: title.into(),
            description: None,
        }
    }

    /// Links the appointment to a client.
    #[must_use]
    pub const fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One mirrored write succeeded and the other failed.
///
/// The appointment write is committed and authoritative; only the client's
/// scheduling status still needs `pending_mirror` applied. Callers retry
/// the mirror step, not the whole operation.
#[derive(Debug, Clone, Error)]
#[error(
    "appointment {appointment_id} committed but mirroring {pending_mirror} onto client {client_id} failed: {cause}"
)]
pub struct PartialSyncError {
    appointment_id: AppointmentId,
    client_id: ClientId,
    pending_mirror: SchedulingMirror,
    #[source]
    cause: ClientRepositoryError,
}

impl PartialSyncError {
    /// Returns the committed appointment.
    #[must_use]
    pub const fn appointment_id(&self) -> AppointmentId {
        self.appointment_id
    }

    /// Returns the client whose mirror was not updated.
    #[must_use]
    pub const fn client_id(&self) -> ClientId {
        self.client_id
    }

    /// Returns the mirror value that still needs to be applied.
    #[must_use]
    pub const fn pending_mirror(&self) -> SchedulingMirror {
        self.pending_mirror
    }

    /// Returns the failure of the mirror write.
    #[must_use]
    pub const fn cause(&self) -> &ClientRepositoryError {
        &self.cause
    }
}

/// Service-level errors for scheduling operations.
#[derive(Debug, Error)]
pub enum SchedulingError {
    /// Authorization denied.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] SchedulingDomainError),
    /// Appointment repository operation failed.
    #[error(transparent)]
    Appointments(#[from] AppointmentRepositoryError),
    /// The appointment write committed but the client mirror did not.
    #[error(transparent)]
    PartialSync(#[from] PartialSyncError),
}

/// Result type for scheduling service operations.
pub type SchedulingResult<T> = Result<T, SchedulingError>;

/// Appointment orchestration service.
#[derive(Clone)]
pub struct SchedulingCoordinator<A, R, C>
where
    A: AppointmentRepository,
    R: ClientRepository,
    C: Clock + Send + Sync,
{
    appointments: Arc<A>,
    clients: Arc<R>,
    clock: Arc<C>,
}

impl<A, R, C> SchedulingCoordinator<A, R, C>
where
    A: AppointmentRepository,
    R: ClientRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new scheduling coordinator.
    #[must_use]
    pub const fn new(appointments: Arc<A>, clients: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            appointments,
            clients,
            clock,
        }
    }

    /// Schedules a new appointment. Brokers may only schedule for
    /// themselves. For a client-linked appointment the owning client's
    /// scheduling status becomes `Awaiting`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) when a broker schedules for
    /// another broker, validation and repository errors otherwise, and
    /// [`PartialSyncError`] (wrapped) when the appointment committed but
    /// the client mirror could not be updated.
    pub async fn create(
        &self,
        request: CreateAppointmentRequest,
        actor: &Actor,
    ) -> SchedulingResult<Appointment> {
        ensure_actor_scope(actor, Some(request.broker_id))?;
        let title = AppointmentTitle::new(request.title)?;
        let appointment = Appointment::schedule(
            request.client_id,
            request.broker_id,
            request.scheduled_at,
            title,
            request.description,
            &*self.clock,
        );
        self.appointments.store(&appointment).await?;
        tracing::info!(
            appointment_id = %appointment.id(),
            broker_id = %appointment.broker_id(),
            scheduled_at = %appointment.scheduled_at(),
            "appointment scheduled"
        );
        self.sync_mirror(&appointment, SchedulingMirror::Awaiting)
            .await?;
        Ok(appointment)
    }

    /// Resolves an appointment to an outcome and mirrors it onto the
    /// owning client.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) when the actor may not update
    /// appointment statuses or does not own the appointment,
    /// [`AppointmentRepositoryError::NotFound`] for an unknown id, and
    /// [`PartialSyncError`] (wrapped) when the mirror write failed.
    pub async fn update_status(
        &self,
        appointment_id: AppointmentId,
        outcome: AppointmentOutcome,
        actor: &Actor,
    ) -> SchedulingResult<Appointment> {
        ensure_can_update_appointment_status(actor)?;
        let mut appointment = self.require(appointment_id).await?;
        ensure_actor_scope(actor, Some(appointment.broker_id()))?;
        appointment.record_outcome(outcome, &*self.clock);
        self.appointments.update(&appointment).await?;
        tracing::info!(
            appointment_id = %appointment_id,
            status = %appointment.status(),
            "appointment outcome recorded"
        );
        self.sync_mirror(&appointment, appointment.status().as_mirror())
            .await?;
        Ok(appointment)
    }

    /// Moves an appointment to a new instant and back to `Scheduled`,
    /// resetting the owning client's scheduling status to `Awaiting`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) when the actor does not own the
    /// appointment, [`AppointmentRepositoryError::NotFound`] for an
    /// unknown id, and [`PartialSyncError`] (wrapped) when the mirror
    /// write failed.
    pub async fn reschedule(
        &self,
        appointment_id: AppointmentId,
        scheduled_at: DateTime<Utc>,
        actor: &Actor,
    ) -> SchedulingResult<Appointment> {
        let mut appointment = self.require(appointment_id).await?;
        ensure_actor_scope(actor, Some(appointment.broker_id()))?;
        appointment.reschedule(scheduled_at, &*self.clock);
        self.appointments.update(&appointment).await?;
        tracing::info!(
            appointment_id = %appointment_id,
            scheduled_at = %scheduled_at,
            "appointment rescheduled"
        );
        self.sync_mirror(&appointment, SchedulingMirror::Awaiting)
            .await?;
        Ok(appointment)
    }

    /// Retrieves an appointment by identifier. Brokers may only see their
    /// own appointments.
    ///
    /// Returns `Ok(None)` when the appointment does not exist. Transient
    /// gateway failures are retried once; this is a pure read.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) when a broker targets another
    /// broker's appointment, and repository errors otherwise.
    pub async fn find_by_id(
        &self,
        appointment_id: AppointmentId,
        actor: &Actor,
    ) -> SchedulingResult<Option<Appointment>> {
        let first = self.appointments.find_by_id(appointment_id).await;
        let found = match first {
            Err(err) if err.is_transient() => self.appointments.find_by_id(appointment_id).await?,
            other => other?,
        };
        if let Some(appointment) = &found {
            ensure_actor_scope(actor, Some(appointment.broker_id()))?;
        }
        Ok(found)
    }

    /// Returns still-scheduled appointments whose instant is strictly
    /// before `now`, ascending. Broker actors see only their own.
    /// Transient gateway failures are retried once; this is a pure read.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::Appointments`] when the read fails.
    pub async fn list_overdue(
        &self,
        now: DateTime<Utc>,
        actor: &Actor,
    ) -> SchedulingResult<Vec<Appointment>> {
        let scope = BrokerScope::for_actor(actor);
        let first = self.appointments.list_scheduled_before(now, scope).await;
        let listed = match first {
            Err(err) if err.is_transient() => {
                self.appointments.list_scheduled_before(now, scope).await?
            }
            other => other?,
        };
        Ok(listed)
    }

    /// Returns still-scheduled appointments within `horizon_days` of `now`
    /// (inclusive window starting at `now`), ascending. Broker actors see
    /// only their own. Transient gateway failures are retried once; this
    /// is a pure read.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulingError::Appointments`] when the read fails.
    pub async fn list_upcoming(
        &self,
        now: DateTime<Utc>,
        horizon_days: u16,
        actor: &Actor,
    ) -> SchedulingResult<Vec<Appointment>> {
        let scope = BrokerScope::for_actor(actor);
        let until = now + Duration::days(i64::from(horizon_days));
        let first = self
            .appointments
            .list_scheduled_between(now, until, scope)
            .await;
        let listed = match first {
            Err(err) if err.is_transient() => {
                self.appointments
                    .list_scheduled_between(now, until, scope)
                    .await?
            }
            other => other?,
        };
        Ok(listed)
    }

    /// Re-issues the client-mirror write recorded in a previous
    /// [`PartialSyncError`]. The appointment side is already committed and
    /// is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`PartialSyncError`] (wrapped) again when the mirror write
    /// keeps failing.
    pub async fn resync_client_mirror(&self, pending: &PartialSyncError) -> SchedulingResult<()> {
        match self
            .apply_mirror(pending.client_id(), pending.pending_mirror())
            .await
        {
            Ok(()) => Ok(()),
            Err(cause) => Err(SchedulingError::PartialSync(PartialSyncError {
                appointment_id: pending.appointment_id(),
                client_id: pending.client_id(),
                pending_mirror: pending.pending_mirror(),
                cause,
            })),
        }
    }

    /// Pushes the mirror value onto the owning client, retrying once. The
    /// appointment write has already committed when this runs, so failure
    /// is a partial sync, not a rollback.
    async fn sync_mirror(
        &self,
        appointment: &Appointment,
        mirror: SchedulingMirror,
    ) -> Result<(), PartialSyncError> {
        let Some(client_id) = appointment.client_id() else {
            return Ok(());
        };
        if let Err(first) = self.apply_mirror(client_id, mirror).await {
            tracing::warn!(
                appointment_id = %appointment.id(),
                client_id = %client_id,
                error = %first,
                "client mirror write failed, retrying once"
            );
            if let Err(second) = self.apply_mirror(client_id, mirror).await {
                return Err(PartialSyncError {
                    appointment_id: appointment.id(),
                    client_id,
                    pending_mirror: mirror,
                    cause: second,
                });
            }
        }
        Ok(())
    }

    async fn apply_mirror(
        &self,
        client_id: ClientId,
        mirror: SchedulingMirror,
    ) -> Result<(), ClientRepositoryError> {
        let mut client = self
            .clients
            .find_by_id(client_id)
            .await?
            .ok_or(ClientRepositoryError::NotFound(client_id))?;
        client.set_scheduling_mirror(mirror, &*self.clock);
        self.clients.update(&client).await
    }

    async fn require(&self, appointment_id: AppointmentId) -> SchedulingResult<Appointment> {
        self.appointments
            .find_by_id(appointment_id)
            .await?
            .ok_or_else(|| AppointmentRepositoryError::NotFound(appointment_id).into())
    }
}
