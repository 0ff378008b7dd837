//! Cached pending-intake counter driven by the client change feed.

use crate::access::Role;
use crate::client::{
    domain::ClientId,
    ports::{ClientEvent, ClientRepository, ClientRepositoryError},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Buffered alerts per subscriber before slow consumers drop alerts.
const ALERT_CAPACITY: usize = 32;

/// Side-channel alert raised when a new pending client arrives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAlert {
    /// The newly arrived client.
    pub client_id: ClientId,
    /// Cached pending count after the arrival.
    pub pending: u64,
}

/// Live count of clients awaiting broker assignment.
///
/// The count is a single-writer cache: the subscription loop (or an
/// explicit [`PendingIntakeCounter::reconcile`]) is the only writer, UI
/// reads are lock-free snapshots. Brokers never see unassigned intake and
/// always read zero.
pub struct PendingIntakeCounter<R>
where
    R: ClientRepository,
{
    clients: Arc<R>,
    count: AtomicU64,
    alerts: broadcast::Sender<PendingAlert>,
}

impl<R> PendingIntakeCounter<R>
where
    R: ClientRepository,
{
    /// Creates a counter backed by the given repository. The cached count
    /// starts at zero until the first reconcile.
    #[must_use]
    pub fn new(clients: Arc<R>) -> Self {
        let (alerts, _) = broadcast::channel(ALERT_CAPACITY);
        Self {
            clients,
            count: AtomicU64::new(0),
            alerts,
        }
    }

    /// Returns the cached pending count for the role. Brokers
    /// unconditionally see zero.
    #[must_use]
    pub fn pending_count(&self, role: Role) -> u64 {
        match role {
            Role::Broker => 0,
            Role::Administrator | Role::Developer => self.count.load(Ordering::Relaxed),
        }
    }

    /// Registers a new subscriber to the new-pending alert channel.
    #[must_use]
    pub fn alerts(&self) -> broadcast::Receiver<PendingAlert> {
        self.alerts.subscribe()
    }

    /// Applies one change-feed event to the cached count. Only pending
    /// creations move the count; assignment and deletion drift is mopped
    /// up by the next [`PendingIntakeCounter::reconcile`].
    pub fn handle_event(&self, event: &ClientEvent) {
        let ClientEvent::Created { client_id, status } = event else {
            return;
        };
        if !status.is_intake() {
            return;
        }
        let pending = self.count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(client_id = %client_id, pending, "new pending client detected");
        let alert = PendingAlert {
            client_id: *client_id,
            pending,
        };
        // A send error only means no subscriber is currently listening.
        if let Err(unsent) = self.alerts.send(alert) {
            tracing::debug!(client_id = %unsent.0.client_id, "no alert subscribers");
        }
    }

    /// Replaces the cached count with a full recount from the repository,
    /// returning the fresh value. Transient gateway failures are retried
    /// once; this is a pure read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientRepositoryError`] when the recount fails; the cached
    /// count is left untouched.
    pub async fn reconcile(&self) -> Result<u64, ClientRepositoryError> {
        let first = self.clients.count_pending().await;
        let fresh = match first {
            Err(err) if err.is_transient() => self.clients.count_pending().await?,
            other => other?,
        };
        self.count.store(fresh, Ordering::Relaxed);
        Ok(fresh)
    }

    /// Drives the counter from a change-feed subscription until the feed
    /// closes. Reconciles on entry (the subscription may start mid-stream)
    /// and after every reported lag, since the feed is neither durable nor
    /// gap-free.
    ///
    /// # Errors
    ///
    /// Returns [`ClientRepositoryError`] when a reconcile fails; the caller
    /// resubscribes and calls `run` again.
    pub async fn run(
        &self,
        mut feed: broadcast::Receiver<ClientEvent>,
    ) -> Result<(), ClientRepositoryError> {
        self.reconcile().await?;
        loop {
            match feed.recv().await {
                Ok(event) => self.handle_event(&event),
                Err(RecvError::Closed) => return Ok(()),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "client change feed lagged, recounting");
                    self.reconcile().await?;
                }
            }
        }
    }
}
