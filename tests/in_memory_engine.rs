//! End-to-end engine scenarios against the in-memory adapters.
//!
//! Each test drives the public service layer the way the administrative
//! shell does: intake, broker assignment, pipeline edits, scheduling with
//! mirror sync, and the pending-intake counter riding the change feed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eyre::{bail, ensure, OptionExt};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use veranda::access::{Actor, Role, StaffId};
use veranda::client::{
    adapters::memory::{InMemoryClientRepository, InMemoryDocumentStore},
    domain::{PipelineStatus, SchedulingMirror},
    ports::{ClientChangeFeed, ClientEvent, ClientRepository},
    services::{ClientIntakeRequest, ClientPipelineError, ClientPipelineService, StaffClientRequest},
};
use veranda::notification::PendingIntakeCounter;
use veranda::scheduling::{
    adapters::memory::InMemoryAppointmentRepository,
    domain::{AppointmentOutcome, AppointmentStatus, TemporalClass},
    services::{CreateAppointmentRequest, SchedulingCoordinator, SchedulingError},
};

type Pipeline = ClientPipelineService<
    InMemoryClientRepository,
    InMemoryDocumentStore,
    InMemoryAppointmentRepository,
    DefaultClock,
>;
type Coordinator = SchedulingCoordinator<
    InMemoryAppointmentRepository,
    InMemoryClientRepository,
    DefaultClock,
>;

struct Engine {
    clients: Arc<InMemoryClientRepository>,
    pipeline: Pipeline,
    coordinator: Coordinator,
}

#[fixture]
fn engine() -> Engine {
    let clients = Arc::new(InMemoryClientRepository::new());
    let documents = Arc::new(InMemoryDocumentStore::new());
    let appointments = Arc::new(InMemoryAppointmentRepository::new());
    let clock = Arc::new(DefaultClock);
    let pipeline = ClientPipelineService::new(
        Arc::clone(&clients),
        documents,
        Arc::clone(&appointments),
        Arc::clone(&clock),
    );
    let coordinator = SchedulingCoordinator::new(appointments, Arc::clone(&clients), clock);
    Engine {
        clients,
        pipeline,
        coordinator,
    }
}

#[fixture]
fn admin() -> Actor {
    Actor::new(StaffId::new(), Role::Administrator)
}

fn at(value: &str) -> eyre::Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn intake_assignment_happens_exactly_once(engine: Engine, admin: Actor) -> eyre::Result<()> {
    let client = engine
        .pipeline
        .create_pending(ClientIntakeRequest::new("Rui Costa", "site"))
        .await?;
    ensure!(client.status() == PipelineStatus::Pending);
    ensure!(client.broker_id().is_none());

    let broker_id = StaffId::new();
    let assigned = engine
        .pipeline
        .assign_broker(client.id(), broker_id, &admin)
        .await?;
    ensure!(assigned.status() == PipelineStatus::New);
    ensure!(assigned.broker_id() == Some(broker_id));

    let again = engine
        .pipeline
        .assign_broker(client.id(), StaffId::new(), &admin)
        .await;
    if !matches!(again, Err(ClientPipelineError::Domain(_))) {
        bail!("expected invalid transition, got {again:?}");
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn overdue_visits_resolve_and_mirror_onto_the_client(
    engine: Engine,
    admin: Actor,
) -> eyre::Result<()> {
    let client = engine
        .pipeline
        .create_pending(ClientIntakeRequest::new("Rui Costa", "site"))
        .await?;
    let broker = Actor::new(StaffId::new(), Role::Broker);
    drop(
        engine
            .pipeline
            .assign_broker(client.id(), broker.id(), &admin)
            .await?,
    );

    let request = CreateAppointmentRequest::new(
        broker.id(),
        at("2025-03-10T14:00:00Z")?,
        "Apartment viewing",
    )
    .with_client(client.id());
    let appointment = engine.coordinator.create(request, &broker).await?;

    let now = at("2025-03-11T09:00:00Z")?;
    ensure!(appointment.classify(now) == TemporalClass::Overdue);
    let overdue = engine.coordinator.list_overdue(now, &broker).await?;
    ensure!(overdue.iter().any(|entry| entry.id() == appointment.id()));

    drop(
        engine
            .coordinator
            .update_status(appointment.id(), AppointmentOutcome::NotCompleted, &broker)
            .await?,
    );

    let mirrored = engine
        .clients
        .find_by_id(client.id())
        .await?
        .ok_or_eyre("client should exist")?;
    ensure!(mirrored.scheduling_status() == Some(SchedulingMirror::NotCompleted));
    ensure!(engine.coordinator.list_overdue(now, &broker).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn locked_stages_reserve_edits_for_the_back_office(
    engine: Engine,
    admin: Actor,
) -> eyre::Result<()> {
    let broker = Actor::new(StaffId::new(), Role::Broker);
    let request = StaffClientRequest::new(ClientIntakeRequest::new("Rui Costa", "site"))
        .with_broker(broker.id());
    let client = engine.pipeline.create_staff(request, &admin).await?;
    drop(
        engine
            .pipeline
            .set_status(client.id(), PipelineStatus::BankReview, &admin)
            .await?,
    );
    let before = engine
        .clients
        .find_by_id(client.id())
        .await?
        .ok_or_eyre("client should exist")?;

    let denied = engine
        .pipeline
        .set_status(client.id(), PipelineStatus::Approved, &broker)
        .await;
    if !matches!(denied, Err(ClientPipelineError::Access(_))) {
        bail!("expected access denial, got {denied:?}");
    }
    let after = engine
        .clients
        .find_by_id(client.id())
        .await?
        .ok_or_eyre("client should exist")?;
    ensure!(after == before);

    let approved = engine
        .pipeline
        .set_status(client.id(), PipelineStatus::Approved, &admin)
        .await?;
    ensure!(approved.status() == PipelineStatus::Approved);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn rescheduling_a_completed_visit_reopens_it(engine: Engine, admin: Actor) -> eyre::Result<()> {
    let broker = Actor::new(StaffId::new(), Role::Broker);
    let request = StaffClientRequest::new(ClientIntakeRequest::new("Rui Costa", "site"))
        .with_broker(broker.id());
    let client = engine.pipeline.create_staff(request, &admin).await?;
    let appointment = engine
        .coordinator
        .create(
            CreateAppointmentRequest::new(
                broker.id(),
                at("2025-03-10T14:00:00Z")?,
                "Apartment viewing",
            )
            .with_client(client.id()),
            &broker,
        )
        .await?;
    drop(
        engine
            .coordinator
            .update_status(appointment.id(), AppointmentOutcome::Completed, &broker)
            .await?,
    );

    let new_instant = at("2025-03-20T10:00:00Z")?;
    let rescheduled = engine
        .coordinator
        .reschedule(appointment.id(), new_instant, &broker)
        .await?;

    ensure!(rescheduled.status() == AppointmentStatus::Scheduled);
    ensure!(rescheduled.scheduled_at() == new_instant);
    let mirrored = engine
        .clients
        .find_by_id(client.id())
        .await?
        .ok_or_eyre("client should exist")?;
    ensure!(mirrored.scheduling_status() == Some(SchedulingMirror::Awaiting));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn appointment_outcomes_only_accept_resolutions(engine: Engine, admin: Actor) {
    // The outcome parameter admits Completed and NotCompleted only; a
    // manual return to Scheduled is unrepresentable, so the only path back
    // is reschedule. Unknown appointments still report cleanly.
    let result = engine
        .coordinator
        .update_status(
            veranda::scheduling::domain::AppointmentId::new(),
            AppointmentOutcome::Completed,
            &admin,
        )
        .await;
    assert!(matches!(result, Err(SchedulingError::Appointments(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn the_change_feed_drives_the_pending_counter(engine: Engine) -> eyre::Result<()> {
    let counter = PendingIntakeCounter::new(Arc::clone(&engine.clients));
    let mut feed = engine.clients.subscribe();

    let first = engine
        .pipeline
        .create_pending(ClientIntakeRequest::new("Rui Costa", "site"))
        .await?;
    let second = engine
        .pipeline
        .create_pending(ClientIntakeRequest::new("Ana Lopes", "referral"))
        .await?;

    for expected in [first.id(), second.id()] {
        let event = feed.recv().await?;
        let ClientEvent::Created { client_id, status } = event else {
            bail!("expected creation event, got {event:?}");
        };
        ensure!(client_id == expected);
        ensure!(status == PipelineStatus::Pending);
        counter.handle_event(&ClientEvent::Created { client_id, status });
    }

    ensure!(counter.pending_count(Role::Administrator) == 2);
    ensure!(counter.pending_count(Role::Broker) == 0);
    ensure!(counter.reconcile().await? == 2);
    Ok(())
}
