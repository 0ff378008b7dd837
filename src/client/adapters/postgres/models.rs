//! Diesel row models for client persistence.

use super::schema::clients;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for client records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = clients)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ClientRow {
    /// Client identifier.
    pub id: uuid::Uuid,
    /// Contact JSON payload.
    pub contact: Value,
    /// Acquisition channel label.
    pub origin: String,
    /// Pipeline status.
    pub status: String,
    /// Assigned broker, absent while pending.
    pub broker_id: Option<uuid::Uuid>,
    /// Mirrored status of the latest appointment.
    pub scheduling_status: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for client records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = clients)]
pub struct NewClientRow {
    /// Client identifier.
    pub id: uuid::Uuid,
    /// Contact JSON payload.
    pub contact: Value,
    /// Acquisition channel label.
    pub origin: String,
    /// Pipeline status.
    pub status: String,
    /// Assigned broker, absent while pending.
    pub broker_id: Option<uuid::Uuid>,
    /// Mirrored status of the latest appointment.
    pub scheduling_status: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
