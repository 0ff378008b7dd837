//! Repository ports for client persistence and dependent document cleanup.

use crate::access::BrokerScope;
use crate::client::domain::{Client, ClientId, PipelineStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for client repository operations.
pub type ClientRepositoryResult<T> = Result<T, ClientRepositoryError>;

/// Client persistence contract.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Stores a new client.
    ///
    /// # Errors
    ///
    /// Returns [`ClientRepositoryError::DuplicateClient`] when the client ID
    /// already exists.
    async fn store(&self, client: &Client) -> ClientRepositoryResult<()>;

    /// Persists changes to an existing client (status, broker, mirror,
    /// timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`ClientRepositoryError::NotFound`] when the client does not
    /// exist.
    async fn update(&self, client: &Client) -> ClientRepositoryResult<()>;

    /// Finds a client by identifier.
    ///
    /// Returns `None` when the client does not exist.
    async fn find_by_id(&self, id: ClientId) -> ClientRepositoryResult<Option<Client>>;

    /// Removes a client row. Dependent documents and appointments must have
    /// been removed beforehand; the cascade ordering is the service's job.
    ///
    /// # Errors
    ///
    /// Returns [`ClientRepositoryError::NotFound`] when the client does not
    /// exist.
    async fn delete(&self, id: ClientId) -> ClientRepositoryResult<()>;

    /// Returns clients in the given pipeline stage, ascending by creation
    /// time, optionally restricted to one broker's clients.
    async fn list_by_status(
        &self,
        status: PipelineStatus,
        scope: BrokerScope,
    ) -> ClientRepositoryResult<Vec<Client>>;

    /// Returns the number of clients awaiting broker assignment.
    async fn count_pending(&self) -> ClientRepositoryResult<u64>;
}

/// Errors returned by client repository implementations.
#[derive(Debug, Clone, Error)]
pub enum ClientRepositoryError {
    /// A client with the same identifier already exists.
    #[error("duplicate client identifier: {0}")]
    DuplicateClient(ClientId),

    /// The client was not found.
    #[error("client not found: {0}")]
    NotFound(ClientId),

    /// Gateway-level timeout or connectivity failure; safe to retry for
    /// pure reads.
    #[error("transient gateway failure: {0}")]
    Transient(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl ClientRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a transient gateway error.
    pub fn transient(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transient(Arc::new(err))
    }

    /// Returns whether the error is a transient gateway failure.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Result type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

/// Dependent-document cleanup contract.
///
/// Document content management is out of scope for the engine; this port
/// exists so the client delete cascade can honour referential cleanup
/// ordering (documents before appointments before the client row).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Removes every document belonging to the client, returning how many
    /// rows were removed.
    async fn delete_for_client(&self, client_id: ClientId) -> DocumentStoreResult<u64>;
}

/// Errors returned by document store implementations.
#[derive(Debug, Clone, Error)]
pub enum DocumentStoreError {
    /// Gateway-level timeout or connectivity failure.
    #[error("transient gateway failure: {0}")]
    Transient(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl DocumentStoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
