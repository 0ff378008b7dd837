//! Veranda: real-estate brokerage back-office engine.
//!
//! This crate provides the core functionality of the brokerage back office:
//! the client sales pipeline, broker-scoped appointment scheduling with
//! wall-clock classification, and the pending-intake notification counter.
//!
//! # Architecture
//!
//! Veranda follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, channels, etc.)
//!
//! # Modules
//!
//! - [`access`]: Roles, actor identity, and authorization predicates
//! - [`client`]: Client aggregate and pipeline state machine
//! - [`scheduling`]: Appointments, temporal classification, mirror sync
//! - [`notification`]: Pending-intake counter and alert fan-out

pub mod access;
pub mod client;
pub mod notification;
pub mod scheduling;
