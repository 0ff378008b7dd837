//! Unit tests for the pending-intake counter.

use std::sync::Arc;

use super::PendingIntakeCounter;
use crate::access::Role;
use crate::client::{
    adapters::memory::InMemoryClientRepository,
    domain::{Client, ClientContact, ClientId, LeadOrigin, PipelineStatus},
    ports::{ClientEvent, ClientRepository},
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use tokio::sync::broadcast;

type TestCounter = PendingIntakeCounter<InMemoryClientRepository>;

#[fixture]
fn repository() -> Arc<InMemoryClientRepository> {
    Arc::new(InMemoryClientRepository::new())
}

fn created_pending() -> ClientEvent {
    ClientEvent::Created {
        client_id: ClientId::new(),
        status: PipelineStatus::Pending,
    }
}

async fn seed_pending(repository: &InMemoryClientRepository, count: usize) -> eyre::Result<()> {
    for _ in 0..count {
        let client = Client::new_pending(
            ClientContact::new("Rui Costa")?,
            LeadOrigin::new("site")?,
            &DefaultClock,
        );
        repository.store(&client).await?;
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_pending_creations_move_the_count(repository: Arc<InMemoryClientRepository>) {
    let counter = TestCounter::new(repository);

    counter.handle_event(&created_pending());
    counter.handle_event(&ClientEvent::Created {
        client_id: ClientId::new(),
        status: PipelineStatus::New,
    });
    counter.handle_event(&ClientEvent::Updated {
        client_id: ClientId::new(),
        status: PipelineStatus::Pending,
    });
    counter.handle_event(&ClientEvent::Deleted {
        client_id: ClientId::new(),
    });

    assert_eq!(counter.pending_count(Role::Administrator), 1);
    assert_eq!(counter.pending_count(Role::Developer), 1);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn brokers_always_read_zero(repository: Arc<InMemoryClientRepository>) {
    let counter = TestCounter::new(repository);
    counter.handle_event(&created_pending());
    counter.handle_event(&created_pending());

    assert_eq!(counter.pending_count(Role::Broker), 0);
    assert_eq!(counter.pending_count(Role::Administrator), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn each_arrival_raises_an_alert_with_the_fresh_count(
    repository: Arc<InMemoryClientRepository>,
) -> eyre::Result<()> {
    let counter = TestCounter::new(repository);
    let mut alerts = counter.alerts();

    let event = created_pending();
    counter.handle_event(&event);

    let alert = alerts.recv().await?;
    let ClientEvent::Created { client_id, .. } = event else {
        eyre::bail!("fixture should be a creation event");
    };
    ensure!(alert.client_id == client_id);
    ensure!(alert.pending == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reconcile_replaces_event_drift_with_the_true_count(
    repository: Arc<InMemoryClientRepository>,
) -> eyre::Result<()> {
    seed_pending(&repository, 2).await?;
    let counter = TestCounter::new(Arc::clone(&repository));
    // Drift: events arrived that the store never saw.
    counter.handle_event(&created_pending());
    counter.handle_event(&created_pending());
    counter.handle_event(&created_pending());
    ensure!(counter.pending_count(Role::Administrator) == 3);

    let fresh = counter.reconcile().await?;

    ensure!(fresh == 2);
    ensure!(counter.pending_count(Role::Administrator) == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_reconciles_then_applies_events_until_the_feed_closes(
    repository: Arc<InMemoryClientRepository>,
) -> eyre::Result<()> {
    let counter = TestCounter::new(repository);
    let (feed, receiver) = broadcast::channel(16);
    for _ in 0..3 {
        drop(feed.send(created_pending()));
    }
    drop(feed);

    counter.run(receiver).await?;

    ensure!(counter.pending_count(Role::Administrator) == 3);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn run_recounts_after_the_feed_lags(
    repository: Arc<InMemoryClientRepository>,
) -> eyre::Result<()> {
    seed_pending(&repository, 5).await?;
    let counter = TestCounter::new(Arc::clone(&repository));
    // Capacity two: five sends drop the oldest three and the receiver
    // reports the gap before delivering the surviving two events.
    let (feed, receiver) = broadcast::channel(2);
    for _ in 0..5 {
        drop(feed.send(created_pending()));
    }
    drop(feed);

    counter.run(receiver).await?;

    // Recount (5) plus the two delivered events: at-least-once counting
    // until the next reconcile squares it with the store.
    ensure!(counter.pending_count(Role::Administrator) == 7);
    ensure!(counter.reconcile().await? == 5);
    Ok(())
}
