//! `PostgreSQL` repository implementation for client storage.

use super::{
    models::{ClientRow, NewClientRow},
    schema::{clients, documents},
};
use crate::access::{BrokerScope, StaffId};
use crate::client::{
    domain::{
        Client, ClientContact, ClientId, LeadOrigin, PersistedClientData, PipelineStatus,
        SchedulingMirror,
    },
    ports::{
        ClientRepository, ClientRepositoryError, ClientRepositoryResult, DocumentStore,
        DocumentStoreError, DocumentStoreResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by client adapters.
pub type ClientPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed client repository.
#[derive(Debug, Clone)]
pub struct PostgresClientRepository {
    pool: ClientPgPool,
}

impl PostgresClientRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ClientPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> ClientRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> ClientRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            // Pool exhaustion and checkout timeouts are transient; callers
            // may retry pure reads.
            let mut connection = pool.get().map_err(ClientRepositoryError::transient)?;
            f(&mut connection)
        })
        .await
        .map_err(ClientRepositoryError::persistence)?
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn store(&self, client: &Client) -> ClientRepositoryResult<()> {
        let client_id = client.id();
        let new_row = to_new_row(client)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(clients::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        ClientRepositoryError::DuplicateClient(client_id)
                    }
                    _ => ClientRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, client: &Client) -> ClientRepositoryResult<()> {
        let client_id = client.id();
        let contact =
            serde_json::to_value(client.contact()).map_err(ClientRepositoryError::persistence)?;
        let origin = client.origin().as_str().to_owned();
        let status = client.status().as_str().to_owned();
        let broker_id = client.broker_id().map(StaffId::into_inner);
        let scheduling_status = client
            .scheduling_status()
            .map(|mirror| mirror.as_str().to_owned());
        let updated_at = client.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                clients::table.filter(clients::id.eq(client_id.into_inner())),
            )
            .set((
                clients::contact.eq(contact),
                clients::origin.eq(origin),
                clients::status.eq(status),
                clients::broker_id.eq(broker_id),
                clients::scheduling_status.eq(scheduling_status),
                clients::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(ClientRepositoryError::persistence)?;

            if affected == 0 {
                return Err(ClientRepositoryError::NotFound(client_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: ClientId) -> ClientRepositoryResult<Option<Client>> {
        self.run_blocking(move |connection| {
            let row = clients::table
                .filter(clients::id.eq(id.into_inner()))
                .select(ClientRow::as_select())
                .first::<ClientRow>(connection)
                .optional()
                .map_err(ClientRepositoryError::persistence)?;
            row.map(row_to_client).transpose()
        })
        .await
    }

    async fn delete(&self, id: ClientId) -> ClientRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let affected =
                diesel::delete(clients::table.filter(clients::id.eq(id.into_inner())))
                    .execute(connection)
                    .map_err(ClientRepositoryError::persistence)?;
            if affected == 0 {
                return Err(ClientRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn list_by_status(
        &self,
        status: PipelineStatus,
        scope: BrokerScope,
    ) -> ClientRepositoryResult<Vec<Client>> {
        let status_value = status.as_str().to_owned();
        self.run_blocking(move |connection| {
            let mut query = clients::table
                .select(ClientRow::as_select())
                .filter(clients::status.eq(status_value))
                .into_boxed();
            if let BrokerScope::Only(broker_id) = scope {
                query = query.filter(clients::broker_id.eq(broker_id.into_inner()));
            }
            let rows = query
                .order(clients::created_at.asc())
                .load::<ClientRow>(connection)
                .map_err(ClientRepositoryError::persistence)?;
            rows.into_iter().map(row_to_client).collect()
        })
        .await
    }

    async fn count_pending(&self) -> ClientRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let count: i64 = clients::table
                .filter(clients::status.eq(PipelineStatus::Pending.as_str()))
                .count()
                .get_result(connection)
                .map_err(ClientRepositoryError::persistence)?;
            u64::try_from(count).map_err(ClientRepositoryError::persistence)
        })
        .await
    }
}

fn to_new_row(client: &Client) -> ClientRepositoryResult<NewClientRow> {
    let contact =
        serde_json::to_value(client.contact()).map_err(ClientRepositoryError::persistence)?;

    Ok(NewClientRow {
        id: client.id().into_inner(),
        contact,
        origin: client.origin().as_str().to_owned(),
        status: client.status().as_str().to_owned(),
        broker_id: client.broker_id().map(StaffId::into_inner),
        scheduling_status: client
            .scheduling_status()
            .map(|mirror| mirror.as_str().to_owned()),
        created_at: client.created_at(),
        updated_at: client.updated_at(),
    })
}

fn row_to_client(row: ClientRow) -> ClientRepositoryResult<Client> {
    let contact = serde_json::from_value::<ClientContact>(row.contact)
        .map_err(ClientRepositoryError::persistence)?;
    let origin = LeadOrigin::new(row.origin).map_err(ClientRepositoryError::persistence)?;
    let status = PipelineStatus::try_from(row.status.as_str())
        .map_err(ClientRepositoryError::persistence)?;
    let scheduling_status = row
        .scheduling_status
        .as_deref()
        .map(SchedulingMirror::try_from)
        .transpose()
        .map_err(ClientRepositoryError::persistence)?;

    let data = PersistedClientData {
        id: ClientId::from_uuid(row.id),
        contact,
        origin,
        status,
        broker_id: row.broker_id.map(StaffId::from_uuid),
        scheduling_status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Client::from_persisted(data))
}

/// `PostgreSQL`-backed document store covering the delete cascade.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: ClientPgPool,
}

impl PostgresDocumentStore {
    /// Creates a new document store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: ClientPgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn delete_for_client(&self, client_id: ClientId) -> DocumentStoreResult<u64> {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool
                .get()
                .map_err(|err| DocumentStoreError::Transient(std::sync::Arc::new(err)))?;
            let removed = diesel::delete(
                documents::table.filter(documents::client_id.eq(client_id.into_inner())),
            )
            .execute(&mut connection)
            .map_err(DocumentStoreError::persistence)?;
            u64::try_from(removed).map_err(DocumentStoreError::persistence)
        })
        .await
        .map_err(DocumentStoreError::persistence)?
    }
}
