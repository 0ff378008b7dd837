//! Change-event feed port for client records.

use crate::client::domain::{ClientId, PipelineStatus};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Change event emitted after a committed client write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// A client row was inserted.
    Created {
        /// Identifier of the new client.
        client_id: ClientId,
        /// Pipeline status at creation time.
        status: PipelineStatus,
    },
    /// A client row was updated.
    Updated {
        /// Identifier of the updated client.
        client_id: ClientId,
        /// Pipeline status after the update.
        status: PipelineStatus,
    },
    /// A client row was removed.
    Deleted {
        /// Identifier of the removed client.
        client_id: ClientId,
    },
}

/// Push-style change feed over client records.
///
/// Delivery is best-effort: receivers may lag and drop events, and no
/// replay is guaranteed. Consumers that keep derived state (the
/// pending-intake counter) must reconcile against a full recount after any
/// gap.
pub trait ClientChangeFeed: Send + Sync {
    /// Registers a new subscriber to the change feed.
    fn subscribe(&self) -> broadcast::Receiver<ClientEvent>;
}
