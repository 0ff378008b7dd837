//! Client aggregate root and pipeline transitions.

use super::{
    ClientContact, ClientDomainError, ClientId, LeadOrigin, PipelineStatus, SchedulingMirror,
};
use crate::access::StaffId;
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Client aggregate root.
///
/// Invariant: `status == Pending` iff `broker_id` is `None`. Both
/// constructors and [`Client::assign_broker`] maintain it; persistence
/// reconstruction trusts the stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    id: ClientId,
    contact: ClientContact,
    origin: LeadOrigin,
    status: PipelineStatus,
    broker_id: Option<StaffId>,
    scheduling_status: Option<SchedulingMirror>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted client aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedClientData {
    /// Persisted client identifier.
    pub id: ClientId,
    /// Persisted contact details.
    pub contact: ClientContact,
    /// Persisted acquisition channel.
    pub origin: LeadOrigin,
    /// Persisted pipeline status.
    pub status: PipelineStatus,
    /// Persisted broker assignment, if any.
    pub broker_id: Option<StaffId>,
    /// Persisted scheduling mirror, if any appointment exists.
    pub scheduling_status: Option<SchedulingMirror>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Creates a client from public intake: status `Pending`, no broker.
    #[must_use]
    pub fn new_pending(contact: ClientContact, origin: LeadOrigin, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ClientId::new(),
            contact,
            origin,
            status: PipelineStatus::Pending,
            broker_id: None,
            scheduling_status: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Creates a staff-entered client: status `New`, broker required.
    #[must_use]
    pub fn new_staff(
        contact: ClientContact,
        origin: LeadOrigin,
        broker_id: StaffId,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: ClientId::new(),
            contact,
            origin,
            status: PipelineStatus::New,
            broker_id: Some(broker_id),
            scheduling_status: None,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a client from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedClientData) -> Self {
        Self {
            id: data.id,
            contact: data.contact,
            origin: data.origin,
            status: data.status,
            broker_id: data.broker_id,
            scheduling_status: data.scheduling_status,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the client identifier.
    #[must_use]
    pub const fn id(&self) -> ClientId {
        self.id
    }

    /// Returns the contact details.
    #[must_use]
    pub const fn contact(&self) -> &ClientContact {
        &self.contact
    }

    /// Returns the acquisition channel.
    #[must_use]
    pub const fn origin(&self) -> &LeadOrigin {
        &self.origin
    }

    /// Returns the pipeline status.
    #[must_use]
    pub const fn status(&self) -> PipelineStatus {
        self.status
    }

    /// Returns the assigned broker, if any.
    #[must_use]
    pub const fn broker_id(&self) -> Option<StaffId> {
        self.broker_id
    }

    /// Returns the mirrored status of the latest appointment, if any.
    #[must_use]
    pub const fn scheduling_status(&self) -> Option<SchedulingMirror> {
        self.scheduling_status
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

    /// Assigns a broker to a pending client, moving it to `New`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientDomainError::InvalidStatusTransition`] when the
    /// client is not awaiting assignment.
    pub fn assign_broker(
        &mut self,
        broker_id: StaffId,
        clock: &impl Clock,
    ) -> Result<(), ClientDomainError> {
        if self.status != PipelineStatus::Pending {
            return Err(ClientDomainError::InvalidStatusTransition {
                client_id: self.id,
                from: self.status,
                to: PipelineStatus::New,
            });
        }
        self.status = PipelineStatus::New;
        self.broker_id = Some(broker_id);
        self.touch(clock);
        Ok(())
    }

    /// Moves the client to another working pipeline stage.
    ///
    /// Movement between the nine working stages is unrestricted at the
    /// domain level; role-based stage locking is the access policy's job.
    ///
    /// # Errors
    ///
    /// Returns [`ClientDomainError::IntakeOnlyStatus`] when the target is
    /// `Pending`.
    pub fn set_status(
        &mut self,
        new_status: PipelineStatus,
        clock: &impl Clock,
    ) -> Result<(), ClientDomainError> {
        if new_status.is_intake() {
            return Err(ClientDomainError::IntakeOnlyStatus { client_id: self.id });
        }
        self.status = new_status;
        self.touch(clock);
        Ok(())
    }

    /// Overwrites the scheduling mirror with the latest appointment status.
    pub fn set_scheduling_mirror(&mut self, mirror: SchedulingMirror, clock: &impl Clock) {
        self.scheduling_status = Some(mirror);
        self.touch(clock);
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}
