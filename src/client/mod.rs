//! Client intake and pipeline lifecycle management.
//!
//! Clients enter the pipeline either through public intake (status
//! `Pending`, no broker) or directly through staff creation (status `New`,
//! broker required). Staff move clients freely between the nine working
//! stages, subject to the access policy's locked-stage rule, and the
//! scheduling coordinator mirrors the latest appointment status onto the
//! client record. The module follows hexagonal architecture:
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
