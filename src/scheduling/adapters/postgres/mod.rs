//! `PostgreSQL` adapters for appointment persistence.

mod models;
mod repository;
mod schema;

pub use repository::{AppointmentPgPool, PostgresAppointmentRepository};
