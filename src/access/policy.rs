//! Pure authorization predicates and the access error type.
//!
//! Each rule is a pure function over the actor's role (and, for pipeline
//! edits, the client's current status). The `ensure_*` companions return a
//! specific [`AccessError`] so denials are never silently ignored.

use super::{Actor, Role, StaffId};
use crate::client::domain::PipelineStatus;
use std::fmt;
use thiserror::Error;

/// Action named by an authorization denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessAction {
    /// Editing a client's pipeline status.
    MutatePipelineStatus,
    /// Assigning a broker to a pending client.
    AssignBroker,
    /// Deleting a client and its dependent records.
    DeleteClient,
    /// Recording an appointment outcome.
    UpdateAppointmentStatus,
    /// Acting on an entity assigned to another broker.
    ActForBroker,
}

impl AccessAction {
    /// Returns a human-readable description of the action.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::MutatePipelineStatus => "edit the client pipeline status",
            Self::AssignBroker => "assign a broker",
            Self::DeleteClient => "delete a client",
            Self::UpdateAppointmentStatus => "update an appointment status",
            Self::ActForBroker => "act on another broker's entity",
        }
    }
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

/// Authorization denial: the actor's role lacks permission for the action.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("role {role} is not permitted to {action}")]
pub struct AccessError {
    role: Role,
    action: AccessAction,
}

impl AccessError {
    /// Creates a denial for the given role and action.
    #[must_use]
    pub const fn denied(role: Role, action: AccessAction) -> Self {
        Self { role, action }
    }

    /// Returns the denied role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the denied action.
    #[must_use]
    pub const fn action(&self) -> AccessAction {
        self.action
    }
}

/// Returns whether the role may move a client out of its current pipeline
/// status. Back-office roles may edit any stage; brokers are denied while
/// the client sits in a stage reserved for back-office review.
#[must_use]
pub const fn can_mutate_pipeline_status(role: Role, status: PipelineStatus) -> bool {
    match role {
        Role::Administrator | Role::Developer => true,
        Role::Broker => !status.is_review_locked(),
    }
}

/// Returns whether the role may assign a broker to a pending client.
#[must_use]
pub const fn can_assign_broker(role: Role) -> bool {
    matches!(role, Role::Administrator | Role::Developer)
}

/// Returns whether the role may delete a client.
#[must_use]
pub const fn can_delete_client(role: Role) -> bool {
    matches!(role, Role::Administrator | Role::Developer)
}

/// Returns whether the role may record an appointment outcome.
#[must_use]
pub const fn can_update_appointment_status(role: Role) -> bool {
    matches!(
        role,
        Role::Administrator | Role::Developer | Role::Broker
    )
}

/// Checks [`can_mutate_pipeline_status`] for the actor.
///
/// # Errors
///
/// Returns [`AccessError`] when the actor's role may not edit the client's
/// current stage.
pub const fn ensure_can_mutate_pipeline_status(
    actor: &Actor,
    status: PipelineStatus,
) -> Result<(), AccessError> {
    if can_mutate_pipeline_status(actor.role(), status) {
        Ok(())
    } else {
        Err(AccessError::denied(
            actor.role(),
            AccessAction::MutatePipelineStatus,
        ))
    }
}

/// Checks [`can_assign_broker`] for the actor.
///
/// # Errors
///
/// Returns [`AccessError`] when the actor's role may not assign brokers.
pub const fn ensure_can_assign_broker(actor: &Actor) -> Result<(), AccessError> {
    if can_assign_broker(actor.role()) {
        Ok(())
    } else {
        Err(AccessError::denied(actor.role(), AccessAction::AssignBroker))
    }
}

/// Checks [`can_delete_client`] for the actor.
///
/// # Errors
///
/// Returns [`AccessError`] when the actor's role may not delete clients.
pub const fn ensure_can_delete_client(actor: &Actor) -> Result<(), AccessError> {
    if can_delete_client(actor.role()) {
        Ok(())
    } else {
        Err(AccessError::denied(actor.role(), AccessAction::DeleteClient))
    }
}

/// Checks [`can_update_appointment_status`] for the actor.
///
/// # Errors
///
/// Returns [`AccessError`] when the actor's role may not record appointment
/// outcomes.
pub const fn ensure_can_update_appointment_status(actor: &Actor) -> Result<(), AccessError> {
    if can_update_appointment_status(actor.role()) {
        Ok(())
    } else {
        Err(AccessError::denied(
            actor.role(),
            AccessAction::UpdateAppointmentStatus,
        ))
    }
}

/// Checks that the actor may act on an entity assigned to the given broker.
///
/// # Errors
///
/// Returns [`AccessError`] when a broker actor targets an entity assigned to
/// another broker (or to nobody).
pub fn ensure_actor_scope(
    actor: &Actor,
    broker_id: Option<StaffId>,
) -> Result<(), AccessError> {
    if actor.may_act_for(broker_id) {
        Ok(())
    } else {
        Err(AccessError::denied(actor.role(), AccessAction::ActForBroker))
    }
}
