//! Unit tests for broker assignment and pipeline status transitions.

use crate::access::StaffId;
use crate::client::domain::{
    Client, ClientContact, ClientDomainError, LeadOrigin, PipelineStatus,
};
use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

#[fixture]
fn pending_client(clock: DefaultClock) -> Result<Client, ClientDomainError> {
    Ok(Client::new_pending(
        ClientContact::new("Rui Costa")?,
        LeadOrigin::new("site")?,
        &clock,
    ))
}

#[rstest]
fn assign_broker_moves_pending_to_new(
    clock: DefaultClock,
    pending_client: Result<Client, ClientDomainError>,
) -> eyre::Result<()> {
    let mut client = pending_client?;
    let broker_id = StaffId::new();

    client.assign_broker(broker_id, &clock)?;

    ensure!(client.status() == PipelineStatus::New);
    ensure!(client.broker_id() == Some(broker_id));
    Ok(())
}

#[rstest]
fn assign_broker_rejects_already_assigned_client(
    clock: DefaultClock,
    pending_client: Result<Client, ClientDomainError>,
) -> eyre::Result<()> {
    let mut client = pending_client?;
    client.assign_broker(StaffId::new(), &clock)?;
    let snapshot = client.clone();

    let result = client.assign_broker(StaffId::new(), &clock);
    let expected = Err(ClientDomainError::InvalidStatusTransition {
        client_id: client.id(),
        from: PipelineStatus::New,
        to: PipelineStatus::New,
    });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(client == snapshot);
    Ok(())
}

#[rstest]
#[case(PipelineStatus::New, PipelineStatus::BankReview)]
#[case(PipelineStatus::BankReview, PipelineStatus::New)]
#[case(PipelineStatus::Rejected, PipelineStatus::Approved)]
#[case(PipelineStatus::SaleCompleted, PipelineStatus::Rescinded)]
#[case(PipelineStatus::Rescinded, PipelineStatus::InService)]
fn working_stages_move_freely(
    #[case] from: PipelineStatus,
    #[case] to: PipelineStatus,
    clock: DefaultClock,
    pending_client: Result<Client, ClientDomainError>,
) -> eyre::Result<()> {
    let mut client = pending_client?;
    client.assign_broker(StaffId::new(), &clock)?;
    client.set_status(from, &clock)?;

    client.set_status(to, &clock)?;

    ensure!(client.status() == to);
    Ok(())
}

#[rstest]
fn pending_is_unreachable_through_status_edits(
    clock: DefaultClock,
    pending_client: Result<Client, ClientDomainError>,
) -> eyre::Result<()> {
    let mut client = pending_client?;
    client.assign_broker(StaffId::new(), &clock)?;
    let snapshot = client.clone();

    let result = client.set_status(PipelineStatus::Pending, &clock);
    let expected = Err(ClientDomainError::IntakeOnlyStatus {
        client_id: client.id(),
    });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(client == snapshot);
    Ok(())
}
