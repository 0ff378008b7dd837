//! Appointment scheduling and temporal classification.
//!
//! Appointments (client visits and administrative tasks) are created in the
//! `Scheduled` state, resolved to an outcome, or rescheduled back to
//! `Scheduled`. Whether an appointment is upcoming, due today, or overdue is
//! derived on every read from the current wall-clock instant and never
//! persisted. The scheduling coordinator keeps the owning client's
//! denormalized scheduling status in step with the latest appointment,
//! surfacing a dedicated error when the two writes diverge. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
