//! Service orchestration tests for scheduling and mirror synchronization.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::at;
use crate::access::{Actor, BrokerScope, Role, StaffId};
use crate::client::{
    adapters::memory::InMemoryClientRepository,
    domain::{Client, ClientContact, ClientId, LeadOrigin, PipelineStatus, SchedulingMirror},
    ports::{ClientRepository, ClientRepositoryError, ClientRepositoryResult},
};
use crate::scheduling::{
    adapters::memory::InMemoryAppointmentRepository,
    domain::{AppointmentOutcome, AppointmentStatus, TemporalClass},
    ports::AppointmentRepository,
    services::{CreateAppointmentRequest, SchedulingCoordinator, SchedulingError},
};
use eyre::{bail, ensure, OptionExt};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

type TestCoordinator = SchedulingCoordinator<
    InMemoryAppointmentRepository,
    InMemoryClientRepository,
    DefaultClock,
>;

struct Harness {
    coordinator: TestCoordinator,
    appointments: Arc<InMemoryAppointmentRepository>,
    clients: Arc<InMemoryClientRepository>,
}

#[fixture]
fn harness() -> Harness {
    let appointments = Arc::new(InMemoryAppointmentRepository::new());
    let clients = Arc::new(InMemoryClientRepository::new());
    let coordinator = SchedulingCoordinator::new(
        Arc::clone(&appointments),
        Arc::clone(&clients),
        Arc::new(DefaultClock),
    );
    Harness {
        coordinator,
        appointments,
        clients,
    }
}

#[fixture]
fn admin() -> Actor {
    Actor::new(StaffId::new(), Role::Administrator)
}

fn staff_client(broker_id: StaffId) -> eyre::Result<Client> {
    Ok(Client::new_staff(
        ClientContact::new("Rui Costa")?,
        LeadOrigin::new("site")?,
        broker_id,
        &DefaultClock,
    ))
}

async fn seed_client(harness: &Harness, broker_id: StaffId) -> eyre::Result<Client> {
    let client = staff_client(broker_id)?;
    harness.clients.store(&client).await?;
    Ok(client)
}

async fn mirror_of(harness: &Harness, client_id: ClientId) -> eyre::Result<Option<SchedulingMirror>> {
    Ok(harness
        .clients
        .find_by_id(client_id)
        .await?
        .ok_or_eyre("client should exist")?
        .scheduling_status())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn creating_a_linked_appointment_mirrors_awaiting(harness: Harness) -> eyre::Result<()> {
    let broker = Actor::new(StaffId::new(), Role::Broker);
    let client = seed_client(&harness, broker.id()).await?;
    let request = CreateAppointmentRequest::new(
        broker.id(),
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    )
    .with_client(client.id())
    .with_description("Meet at the lobby");

    let appointment = harness.coordinator.create(request, &broker).await?;

    ensure!(appointment.status() == AppointmentStatus::Scheduled);
    ensure!(mirror_of(&harness, client.id()).await? == Some(SchedulingMirror::Awaiting));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn brokers_cannot_schedule_for_other_brokers(
    harness: Harness,
    admin: Actor,
) -> eyre::Result<()> {
    let intruder = Actor::new(StaffId::new(), Role::Broker);
    let request = CreateAppointmentRequest::new(
        StaffId::new(),
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    );

    let result = harness.coordinator.create(request, &intruder).await;

    if !matches!(result, Err(SchedulingError::Access(_))) {
        bail!("expected access denial, got {result:?}");
    }
    let far_future = at("2030-01-01T00:00:00Z")?;
    ensure!(harness.coordinator.list_overdue(far_future, &admin).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn recording_an_outcome_mirrors_it_and_clears_overdue(
    harness: Harness,
) -> eyre::Result<()> {
    let broker = Actor::new(StaffId::new(), Role::Broker);
    let client = seed_client(&harness, broker.id()).await?;
    let request = CreateAppointmentRequest::new(
        broker.id(),
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    )
    .with_client(client.id());
    let appointment = harness.coordinator.create(request, &broker).await?;

    let now = at("2025-03-11T09:00:00Z")?;
    ensure!(appointment.classify(now) == TemporalClass::Overdue);
    let overdue = harness.coordinator.list_overdue(now, &broker).await?;
    ensure!(overdue.iter().any(|entry| entry.id() == appointment.id()));

    let resolved = harness
        .coordinator
        .update_status(appointment.id(), AppointmentOutcome::NotCompleted, &broker)
        .await?;

    ensure!(resolved.status() == AppointmentStatus::NotCompleted);
    ensure!(mirror_of(&harness, client.id()).await? == Some(SchedulingMirror::NotCompleted));
    ensure!(harness.coordinator.list_overdue(now, &broker).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rescheduling_reopens_and_mirrors_awaiting(harness: Harness) -> eyre::Result<()> {
    let broker = Actor::new(StaffId::new(), Role::Broker);
    let client = seed_client(&harness, broker.id()).await?;
    let request = CreateAppointmentRequest::new(
        broker.id(),
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    )
    .with_client(client.id());
    let appointment = harness.coordinator.create(request, &broker).await?;
    drop(
        harness
            .coordinator
            .update_status(appointment.id(), AppointmentOutcome::Completed, &broker)
            .await?,
    );
    ensure!(mirror_of(&harness, client.id()).await? == Some(SchedulingMirror::Completed));

    let new_instant = at("2025-03-20T10:00:00Z")?;
    let rescheduled = harness
        .coordinator
        .reschedule(appointment.id(), new_instant, &broker)
        .await?;

    ensure!(rescheduled.status() == AppointmentStatus::Scheduled);
    ensure!(rescheduled.scheduled_at() == new_instant);
    ensure!(mirror_of(&harness, client.id()).await? == Some(SchedulingMirror::Awaiting));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn administrative_tasks_have_no_mirror(harness: Harness, admin: Actor) -> eyre::Result<()> {
    let request = CreateAppointmentRequest::new(
        StaffId::new(),
        at("2025-03-10T14:00:00Z")?,
        "Quarterly license renewal",
    );

    let appointment = harness.coordinator.create(request, &admin).await?;

    ensure!(appointment.client_id().is_none());
    ensure!(
        harness
            .appointments
            .find_by_id(appointment.id())
            .await?
            .is_some()
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn brokers_cannot_resolve_other_brokers_appointments(
    harness: Harness,
    admin: Actor,
) -> eyre::Result<()> {
    let owner = Actor::new(StaffId::new(), Role::Broker);
    let client = seed_client(&harness, owner.id()).await?;
    let request = CreateAppointmentRequest::new(
        owner.id(),
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    )
    .with_client(client.id());
    let appointment = harness.coordinator.create(request, &admin).await?;
    let intruder = Actor::new(StaffId::new(), Role::Broker);

    let result = harness
        .coordinator
        .update_status(appointment.id(), AppointmentOutcome::Completed, &intruder)
        .await;

    if !matches!(result, Err(SchedulingError::Access(_))) {
        bail!("expected access denial, got {result:?}");
    }
    let stored = harness
        .appointments
        .find_by_id(appointment.id())
        .await?
        .ok_or_eyre("appointment should exist")?;
    ensure!(stored.status() == AppointmentStatus::Scheduled);
    ensure!(mirror_of(&harness, client.id()).await? == Some(SchedulingMirror::Awaiting));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn upcoming_listing_honours_the_horizon_and_orders_ascending(
    harness: Harness,
    admin: Actor,
) -> eyre::Result<()> {
    let broker_id = StaffId::new();
    let now = at("2025-03-10T09:00:00Z")?;
    let instants = [
        at("2025-03-10T10:00:00Z")?,
        at("2025-03-12T09:00:00Z")?,
        at("2025-03-20T09:00:00Z")?,
    ];
    for (index, instant) in instants.into_iter().enumerate() {
        let request = CreateAppointmentRequest::new(broker_id, instant, format!("Visit {index}"));
        drop(harness.coordinator.create(request, &admin).await?);
    }

    let upcoming = harness.coordinator.list_upcoming(now, 7, &admin).await?;

    ensure!(upcoming.len() == 2);
    let scheduled: Vec<_> = upcoming.iter().map(|entry| entry.scheduled_at()).collect();
    ensure!(scheduled == vec![at("2025-03-10T10:00:00Z")?, at("2025-03-12T09:00:00Z")?]);
    Ok(())
}

mockall::mock! {
    Clients {}

    #[async_trait::async_trait]
    impl ClientRepository for Clients {
        async fn store(&self, client: &Client) -> ClientRepositoryResult<()>;
        async fn update(&self, client: &Client) -> ClientRepositoryResult<()>;
        async fn find_by_id(&self, id: ClientId) -> ClientRepositoryResult<Option<Client>>;
        async fn delete(&self, id: ClientId) -> ClientRepositoryResult<()>;
        async fn list_by_status(
            &self,
            status: PipelineStatus,
            scope: BrokerScope,
        ) -> ClientRepositoryResult<Vec<Client>>;
        async fn count_pending(&self) -> ClientRepositoryResult<u64>;
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn failed_mirror_surfaces_partial_sync_and_resyncs(admin: Actor) -> eyre::Result<()> {
    let broker_id = StaffId::new();
    let client = staff_client(broker_id)?;
    let client_id = client.id();

    let mut clients = MockClients::new();
    clients
        .expect_find_by_id()
        .returning(move |_| Ok(Some(client.clone())));
    // The first two update attempts (initial write plus the coordinator's
    // single retry) fail; the resync succeeds.
    let attempts = Arc::new(AtomicUsize::new(0));
    clients.expect_update().returning(move |_| {
        if attempts.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(ClientRepositoryError::persistence(std::io::Error::other(
                "client table unavailable",
            )))
        } else {
            Ok(())
        }
    });

    let appointments = Arc::new(InMemoryAppointmentRepository::new());
    let coordinator = SchedulingCoordinator::new(
        Arc::clone(&appointments),
        Arc::new(clients),
        Arc::new(DefaultClock),
    );
    let request = CreateAppointmentRequest::new(
        broker_id,
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    )
    .with_client(client_id);

    let result = coordinator.create(request, &admin).await;
    let Err(SchedulingError::PartialSync(pending)) = result else {
        bail!("expected partial sync, got {result:?}");
    };
    ensure!(pending.client_id() == client_id);
    ensure!(pending.pending_mirror() == SchedulingMirror::Awaiting);
    // The appointment side committed and stays authoritative.
    ensure!(
        appointments
            .find_by_id(pending.appointment_id())
            .await?
            .is_some()
    );

    coordinator.resync_client_mirror(&pending).await?;
    Ok(())
}
