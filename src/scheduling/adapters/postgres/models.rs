//! Diesel row models for appointment persistence.

use super::schema::appointments;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for appointment records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = appointments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AppointmentRow {
    /// Appointment identifier.
    pub id: uuid::Uuid,
    /// Owning client, absent for administrative tasks.
    pub client_id: Option<uuid::Uuid>,
    /// Assigned broker.
    pub broker_id: uuid::Uuid,
    /// Scheduled instant.
    pub scheduled_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: String,
    /// Appointment title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for appointment records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = appointments)]
pub struct NewAppointmentRow {
    /// Appointment identifier.
    pub id: uuid::Uuid,
    /// Owning client, absent for administrative tasks.
    pub client_id: Option<uuid::Uuid>,
    /// Assigned broker.
    pub broker_id: uuid::Uuid,
    /// Scheduled instant.
    pub scheduled_at: DateTime<Utc>,
    /// Lifecycle status.
    pub status: String,
    /// Appointment title.
    pub title: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}
