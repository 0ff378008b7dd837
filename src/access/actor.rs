//! Staff identity and role types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a staff member (administrator, developer, broker).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaffId(Uuid);

impl StaffId {
    /// Creates a new random staff identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a staff identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for StaffId {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<Uuid> for StaffId {
    fn as_ref(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for StaffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Back-office staff role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access to clients and appointments.
    Administrator,
    /// Same privileges as an administrator; reserved for internal staff.
    Developer,
    /// Sales broker scoped to their own clients and appointments.
    Broker,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::Developer => "developer",
            Self::Broker => "broker",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned while parsing roles from persistence.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown staff role: {0}")]
pub struct ParseRoleError(pub String);

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "administrator" => Ok(Self::Administrator),
            "developer" => Ok(Self::Developer),
            "broker" => Ok(Self::Broker),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Acting staff member, passed explicitly into every engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    id: StaffId,
    role: Role,
}

impl Actor {
    /// Creates an actor from a staff identity and role.
    #[must_use]
    pub const fn new(id: StaffId, role: Role) -> Self {
        Self { id, role }
    }

    /// Returns the actor's staff identifier.
    #[must_use]
    pub const fn id(&self) -> StaffId {
        self.id
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns whether this actor may act on an entity owned by the given
    /// broker. Administrators and developers may act on anything; brokers
    /// only on entities assigned to themselves. An unassigned entity
    /// (`None`) is reachable by back-office roles only.
    #[must_use]
    pub fn may_act_for(&self, broker_id: Option<StaffId>) -> bool {
        match self.role {
            Role::Administrator | Role::Developer => true,
            Role::Broker => broker_id == Some(self.id),
        }
    }
}

/// Broker filter applied to repository reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerScope {
    /// No broker restriction.
    Any,
    /// Restrict to entities assigned to one broker.
    Only(StaffId),
}

impl BrokerScope {
    /// Returns the scope appropriate for the acting staff member: brokers
    /// are confined to their own entities, back-office roles see everything.
    #[must_use]
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.role() {
            Role::Administrator | Role::Developer => Self::Any,
            Role::Broker => Self::Only(actor.id()),
        }
    }

    /// Returns whether an entity with the given broker assignment falls
    /// inside this scope.
    #[must_use]
    pub fn matches(self, broker_id: Option<StaffId>) -> bool {
        match self {
            Self::Any => true,
            Self::Only(id) => broker_id == Some(id),
        }
    }
}
