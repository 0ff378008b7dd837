//! Domain model for client intake and pipeline management.
//!
//! The client domain models public and staff intake, broker assignment,
//! free movement between working pipeline stages, and the denormalized
//! scheduling mirror, keeping all infrastructure concerns outside of the
//! domain boundary.

mod client;
mod contact;
mod error;
mod ids;
mod status;

pub use client::{Client, PersistedClientData};
pub use contact::{ClientContact, LeadOrigin};
pub use error::{
    ClientDomainError, ParsePipelineStatusError, ParseSchedulingMirrorError,
};
pub use ids::ClientId;
pub use status::{PipelineStatus, SchedulingMirror};
