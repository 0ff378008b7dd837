//! Pending-intake notification fan-out.
//!
//! Surfaces an always-current count of clients awaiting broker assignment
//! to back-office roles and raises an alert on every new arrival. The
//! cached count rides the client change feed; because the feed guarantees
//! no delivery, the counter reconciles against a full recount whenever the
//! subscription starts or lags.

mod counter;

pub use counter::{PendingAlert, PendingIntakeCounter};

#[cfg(test)]
mod tests;
