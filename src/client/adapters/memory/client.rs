//! In-memory client repository, document store, and change feed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::access::BrokerScope;
use crate::client::{
    domain::{Client, ClientId, PipelineStatus},
    ports::{
        ClientChangeFeed, ClientEvent, ClientRepository, ClientRepositoryError,
        ClientRepositoryResult, DocumentStore, DocumentStoreError, DocumentStoreResult,
    },
};

/// Buffered events per subscriber before the feed reports a lag.
const FEED_CAPACITY: usize = 64;

/// Thread-safe in-memory client repository that doubles as the change feed.
#[derive(Debug, Clone)]
pub struct InMemoryClientRepository {
    state: Arc<RwLock<InMemoryClientState>>,
    feed: broadcast::Sender<ClientEvent>,
}

#[derive(Debug, Default)]
struct InMemoryClientState {
    clients: HashMap<ClientId, Client>,
}

impl InMemoryClientRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        let (feed, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(InMemoryClientState::default())),
            feed,
        }
    }

    fn publish(&self, event: ClientEvent) {
        // A send error only means no subscriber is currently listening.
        if let Err(unsent) = self.feed.send(event) {
            tracing::debug!(event = ?unsent.0, "no change feed subscribers");
        }
    }
}

impl Default for InMemoryClientRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientChangeFeed for InMemoryClientRepository {
    fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.feed.subscribe()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> ClientRepositoryError {
    ClientRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn store(&self, client: &Client) -> ClientRepositoryResult<()> {
        {
            let mut state = self.state.write().map_err(lock_poisoned)?;
            if state.clients.contains_key(&client.id()) {
                return Err(ClientRepositoryError::DuplicateClient(client.id()));
            }
            state.clients.insert(client.id(), client.clone());
        }
        self.publish(ClientEvent::Created {
            client_id: client.id(),
            status: client.status(),
        });
        Ok(())
    }

    async fn update(&self, client: &Client) -> ClientRepositoryResult<()> {
        {
            let mut state = self.state.write().map_err(lock_poisoned)?;
            if !state.clients.contains_key(&client.id()) {
                return Err(ClientRepositoryError::NotFound(client.id()));
            }
            state.clients.insert(client.id(), client.clone());
        }
        self.publish(ClientEvent::Updated {
            client_id: client.id(),
            status: client.status(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: ClientId) -> ClientRepositoryResult<Option<Client>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.clients.get(&id).cloned())
    }

    async fn delete(&self, id: ClientId) -> ClientRepositoryResult<()> {
        {
            let mut state = self.state.write().map_err(lock_poisoned)?;
            if state.clients.remove(&id).is_none() {
                return Err(ClientRepositoryError::NotFound(id));
            }
        }
        self.publish(ClientEvent::Deleted { client_id: id });
        Ok(())
    }

    async fn list_by_status(
        &self,
        status: PipelineStatus,
        scope: BrokerScope,
    ) -> ClientRepositoryResult<Vec<Client>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut matching: Vec<Client> = state
            .clients
            .values()
            .filter(|client| client.status() == status && scope.matches(client.broker_id()))
            .cloned()
            .collect();
        matching.sort_by_key(|client| (client.created_at(), client.id().into_inner()));
        Ok(matching)
    }

    async fn count_pending(&self) -> ClientRepositoryResult<u64> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let count = state
            .clients
            .values()
            .filter(|client| client.status().is_intake())
            .count();
        u64::try_from(count).map_err(ClientRepositoryError::persistence)
    }
}

/// Thread-safe in-memory document store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    state: Arc<RwLock<HashMap<ClientId, Vec<Uuid>>>>,
}

impl InMemoryDocumentStore {
    /// Creates an empty in-memory document store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a document for the client, returning its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Persistence`] when the store lock is
    /// poisoned.
    pub fn add_for_client(&self, client_id: ClientId) -> DocumentStoreResult<Uuid> {
        let mut state = self.state.write().map_err(doc_lock_poisoned)?;
        let document_id = Uuid::new_v4();
        state.entry(client_id).or_default().push(document_id);
        Ok(document_id)
    }

    /// Returns how many documents the client currently owns.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Persistence`] when the store lock is
    /// poisoned.
    pub fn count_for_client(&self, client_id: ClientId) -> DocumentStoreResult<u64> {
        let state = self.state.read().map_err(doc_lock_poisoned)?;
        let count = state.get(&client_id).map_or(0, Vec::len);
        u64::try_from(count).map_err(DocumentStoreError::persistence)
    }
}

fn doc_lock_poisoned(err: impl std::fmt::Display) -> DocumentStoreError {
    DocumentStoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn delete_for_client(&self, client_id: ClientId) -> DocumentStoreResult<u64> {
        let mut state = self.state.write().map_err(doc_lock_poisoned)?;
        let removed = state.remove(&client_id).map_or(0, |documents| documents.len());
        u64::try_from(removed).map_err(DocumentStoreError::persistence)
    }
}
