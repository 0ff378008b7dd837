//! Authorization for the brokerage back office.
//!
//! Mutations throughout the engine are gated by a small set of pure
//! predicates over the acting staff member's role and, for pipeline edits,
//! the client's current status. The predicates live in [`policy`] so the
//! "any-to-any except locked stages for brokers" rule stays auditable in one
//! place. Actor identity is threaded explicitly through every service call;
//! there is no ambient session state.

mod actor;
pub mod policy;

pub use actor::{Actor, BrokerScope, ParseRoleError, Role, StaffId};
pub use policy::AccessError;
