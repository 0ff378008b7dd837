//! Port contracts for appointment persistence.
//!
//! Ports define infrastructure-agnostic interfaces used by the scheduling
//! coordinator and the client delete cascade.

pub mod repository;

pub use repository::{
    AppointmentRepository, AppointmentRepositoryError, AppointmentRepositoryResult,
};
