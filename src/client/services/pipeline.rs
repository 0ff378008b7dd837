//! Service layer for client intake, pipeline transitions, and deletion.

use crate::access::{
    Actor, BrokerScope, Role, StaffId,
    policy::{
        ensure_actor_scope, ensure_can_assign_broker, ensure_can_delete_client,
        ensure_can_mutate_pipeline_status,
    },
    AccessError,
};
use crate::client::{
    domain::{Client, ClientContact, ClientDomainError, ClientId, LeadOrigin, PipelineStatus},
    ports::{ClientRepository, ClientRepositoryError, DocumentStoreError, DocumentStore},
};
use crate::scheduling::ports::{AppointmentRepository, AppointmentRepositoryError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for public client intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIntakeRequest {
    full_name: String,
    phone: Option<String>,
    email: Option<String>,
    origin: String,
}

impl ClientIntakeRequest {
    /// Creates an intake request with the required fields.
    #[must_use]
    pub fn new(full_name: impl Into<String>, origin: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            phone: None,
            email: None,
            origin: origin.into(),
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    fn into_parts(self) -> Result<(ClientContact, LeadOrigin), ClientDomainError> {
        let mut contact = ClientContact::new(self.full_name)?;
        if let Some(phone) = self.phone {
            contact = contact.with_phone(phone);
        }
        if let Some(email) = self.email {
            contact = contact.with_email(email);
        }
        let origin = LeadOrigin::new(self.origin)?;
        Ok((contact, origin))
    }
}

/// Request payload for staff-entered client creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffClientRequest {
    intake: ClientIntakeRequest,
    broker_id: Option<StaffId>,
}

impl StaffClientRequest {
    /// Creates a staff client request from the intake fields.
    #[must_use]
    pub const fn new(intake: ClientIntakeRequest) -> Self {
        Self {
            intake,
            broker_id: None,
        }
    }

    /// Sets the broker the client is assigned to.
    #[must_use]
    pub const fn with_broker(mut self, broker_id: StaffId) -> Self {
        self.broker_id = Some(broker_id);
        self
    }
}

/// Service-level errors for client pipeline operations.
#[derive(Debug, Error)]
pub enum ClientPipelineError {
    /// Authorization denied.
    #[error(transparent)]
    Access(#[from] AccessError),
    /// Domain validation or transition failure.
    #[error(transparent)]
    Domain(#[from] ClientDomainError),
    /// Client repository operation failed.
    #[error(transparent)]
    Repository(#[from] ClientRepositoryError),
    /// Document cleanup failed during the delete cascade.
    #[error(transparent)]
    Documents(#[from] DocumentStoreError),
    /// Appointment cleanup failed during the delete cascade.
    #[error(transparent)]
    Appointments(#[from] AppointmentRepositoryError),
}

/// Result type for client pipeline service operations.
pub type ClientPipelineResult<T> = Result<T, ClientPipelineError>;

/// Client intake and pipeline orchestration service.
#[derive(Clone)]
pub struct ClientPipelineService<R, D, A, C>
where
    R: ClientRepository,
    D: DocumentStore,
    A: AppointmentRepository,
    C: Clock + Send + Sync,
{
    clients: Arc<R>,
    documents: Arc<D>,
    appointments: Arc<A>,
    clock: Arc<C>,
}

impl<R, D, A, C> ClientPipelineService<R, D, A, C>
where
    R: ClientRepository,
    D: DocumentStore,
    A: AppointmentRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new client pipeline service.
    #[must_use]
    pub const fn new(
        clients: Arc<R>,
        documents: Arc<D>,
        appointments: Arc<A>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            clients,
            documents,
            appointments,
            clock,
        }
    }

    /// Creates a client from public intake: status `Pending`, no broker.
    /// No authorization applies; the intake form is public.
    ///
    /// # Errors
    ///
    /// Returns [`ClientPipelineError`] when intake validation fails or the
    /// repository rejects persistence.
    pub async fn create_pending(
        &self,
        request: ClientIntakeRequest,
    ) -> ClientPipelineResult<Client> {
        let (contact, origin) = request.into_parts()?;
        let client = Client::new_pending(contact, origin, &*self.clock);
        self.clients.store(&client).await?;
        tracing::info!(client_id = %client.id(), origin = %client.origin(), "pending client created");
        Ok(client)
    }

    /// Creates a staff-entered client: status `New`, broker required. A
    /// broker actor's own id overrides whatever the request carries.
    ///
    /// # Errors
    ///
    /// Returns [`ClientDomainError::MissingBroker`] (wrapped) when a
    /// back-office actor omits the broker, and [`ClientPipelineError`] for
    /// validation or persistence failures.
    pub async fn create_staff(
        &self,
        request: StaffClientRequest,
        actor: &Actor,
    ) -> ClientPipelineResult<Client> {
        let broker_id = if actor.role() == Role::Broker {
            actor.id()
        } else {
            request.broker_id.ok_or(ClientDomainError::MissingBroker)?
        };
        let (contact, origin) = request.intake.into_parts()?;
        let client = Client::new_staff(contact, origin, broker_id, &*self.clock);
        self.clients.store(&client).await?;
        tracing::info!(client_id = %client.id(), broker_id = %broker_id, "staff client created");
        Ok(client)
    }

    /// Assigns a broker to a pending client, moving it to `New`.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) for roles without assignment
    /// rights, [`ClientDomainError::InvalidStatusTransition`] when the
    /// client is not pending, and repository errors otherwise.
    pub async fn assign_broker(
        &self,
        client_id: ClientId,
        broker_id: StaffId,
        actor: &Actor,
    ) -> ClientPipelineResult<Client> {
        ensure_can_assign_broker(actor)?;
        let mut client = self.require(client_id).await?;
        client.assign_broker(broker_id, &*self.clock)?;
        self.clients.update(&client).await?;
        tracing::info!(client_id = %client_id, broker_id = %broker_id, "broker assigned");
        Ok(client)
    }

    /// Moves a client to another working pipeline stage.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) when the actor may not edit the
    /// client's current stage or does not own the client,
    /// [`ClientDomainError::IntakeOnlyStatus`] for a `Pending` target, and
    /// repository errors otherwise.
    pub async fn set_status(
        &self,
        client_id: ClientId,
        new_status: PipelineStatus,
        actor: &Actor,
    ) -> ClientPipelineResult<Client> {
        let mut client = self.require(client_id).await?;
        ensure_can_mutate_pipeline_status(actor, client.status())?;
        ensure_actor_scope(actor, client.broker_id())?;
        let previous = client.status();
        client.set_status(new_status, &*self.clock)?;
        self.clients.update(&client).await?;
        tracing::info!(
            client_id = %client_id,
            from = %previous,
            to = %new_status,
            "pipeline status changed"
        );
        Ok(client)
    }

    /// Deletes a client after removing its dependent rows: documents first,
    /// then appointments, then the client itself. The cascade aborts on the
    /// first failing step; earlier steps stay committed and the error names
    /// the step that failed.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) for roles without delete rights,
    /// and the failing store's error when a cascade step fails.
    pub async fn delete(&self, client_id: ClientId, actor: &Actor) -> ClientPipelineResult<()> {
        ensure_can_delete_client(actor)?;
        // Existence check up front so a bad id reports NotFound rather than
        // a half-run cascade.
        drop(self.require(client_id).await?);

        let documents_removed = self.documents.delete_for_client(client_id).await?;
        let appointments_removed = self.appointments.delete_by_client(client_id).await?;
        self.clients.delete(client_id).await?;
        tracing::info!(
            client_id = %client_id,
            documents_removed,
            appointments_removed,
            "client deleted"
        );
        Ok(())
    }

    /// Retrieves a client by identifier. Brokers may only see their own
    /// clients.
    ///
    /// Returns `Ok(None)` when the client does not exist. Transient gateway
    /// failures are retried once; this is a pure read.
    ///
    /// # Errors
    ///
    /// Returns [`AccessError`] (wrapped) when a broker targets another
    /// broker's client, and repository errors otherwise.
    pub async fn find_by_id(
        &self,
        client_id: ClientId,
        actor: &Actor,
    ) -> ClientPipelineResult<Option<Client>> {
        let first = self.clients.find_by_id(client_id).await;
        let found = match first {
            Err(err) if err.is_transient() => self.clients.find_by_id(client_id).await?,
            other => other?,
        };
        if let Some(client) = &found {
            ensure_actor_scope(actor, client.broker_id())?;
        }
        Ok(found)
    }

    /// Returns one kanban column: clients in the given stage, ascending by
    /// creation time. Broker actors see only their own clients. Transient
    /// gateway failures are retried once; this is a pure read.
    ///
    /// # Errors
    ///
    /// Returns [`ClientPipelineError::Repository`] when the read fails.
    pub async fn list_by_status(
        &self,
        status: PipelineStatus,
        actor: &Actor,
    ) -> ClientPipelineResult<Vec<Client>> {
        let scope = BrokerScope::for_actor(actor);
        let first = self.clients.list_by_status(status, scope).await;
        let listed = match first {
            Err(err) if err.is_transient() => self.clients.list_by_status(status, scope).await?,
            other => other?,
        };
        Ok(listed)
    }

    async fn require(&self, client_id: ClientId) -> ClientPipelineResult<Client> {
        self.clients
            .find_by_id(client_id)
            .await?
            .ok_or_else(|| ClientRepositoryError::NotFound(client_id).into())
    }
}
