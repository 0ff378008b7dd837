//! Unit tests for the appointment aggregate.

use super::at;
use crate::access::StaffId;
use crate::client::domain::{ClientId, SchedulingMirror};
use crate::scheduling::domain::{
    Appointment, AppointmentOutcome, AppointmentStatus, AppointmentTitle, SchedulingDomainError,
};
use eyre::ensure;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn visit(clock: &DefaultClock) -> eyre::Result<Appointment> {
    Ok(Appointment::schedule(
        Some(ClientId::new()),
        StaffId::new(),
        at("2025-03-10T14:00:00Z")?,
        AppointmentTitle::new("Apartment viewing")?,
        Some("Meet at the lobby".to_owned()),
        clock,
    ))
}

#[rstest]
fn title_is_trimmed_and_bounded() -> eyre::Result<()> {
    ensure!(AppointmentTitle::new("  Viewing  ")?.as_str() == "Viewing");
    assert_eq!(
        AppointmentTitle::new("   "),
        Err(SchedulingDomainError::EmptyTitle)
    );
    let oversized = "x".repeat(AppointmentTitle::MAX_LEN + 1);
    assert_eq!(
        AppointmentTitle::new(oversized),
        Err(SchedulingDomainError::TitleTooLong {
            length: AppointmentTitle::MAX_LEN + 1,
            limit: AppointmentTitle::MAX_LEN,
        })
    );
    Ok(())
}

#[rstest]
fn scheduling_always_starts_scheduled(clock: DefaultClock) -> eyre::Result<()> {
    let appointment = visit(&clock)?;
    ensure!(appointment.status() == AppointmentStatus::Scheduled);
    ensure!(appointment.created_at() == appointment.updated_at());
    Ok(())
}

#[rstest]
#[case(AppointmentOutcome::Completed, AppointmentStatus::Completed)]
#[case(AppointmentOutcome::NotCompleted, AppointmentStatus::NotCompleted)]
fn outcomes_resolve_the_status(
    #[case] outcome: AppointmentOutcome,
    #[case] expected: AppointmentStatus,
    clock: DefaultClock,
) -> eyre::Result<()> {
    let mut appointment = visit(&clock)?;
    appointment.record_outcome(outcome, &clock);
    ensure!(appointment.status() == expected);
    Ok(())
}

#[rstest]
#[case(AppointmentStatus::Scheduled, SchedulingMirror::Awaiting)]
#[case(AppointmentStatus::Completed, SchedulingMirror::Completed)]
#[case(AppointmentStatus::NotCompleted, SchedulingMirror::NotCompleted)]
fn mirror_translation_is_fixed(
    #[case] status: AppointmentStatus,
    #[case] expected: SchedulingMirror,
) {
    assert_eq!(status.as_mirror(), expected);
}

#[rstest]
fn reschedule_reopens_a_resolved_appointment(clock: DefaultClock) -> eyre::Result<()> {
    let mut appointment = visit(&clock)?;
    appointment.record_outcome(AppointmentOutcome::Completed, &clock);
    let new_instant = at("2025-03-20T10:00:00Z")?;

    appointment.reschedule(new_instant, &clock);

    ensure!(appointment.status() == AppointmentStatus::Scheduled);
    ensure!(appointment.scheduled_at() == new_instant);
    Ok(())
}

#[rstest]
fn reschedule_is_idempotent(clock: DefaultClock) -> eyre::Result<()> {
    let mut appointment = visit(&clock)?;
    let new_instant = at("2025-03-20T10:00:00Z")?;

    appointment.reschedule(new_instant, &clock);
    let once = (appointment.status(), appointment.scheduled_at());
    appointment.reschedule(new_instant, &clock);
    let twice = (appointment.status(), appointment.scheduled_at());

    ensure!(once == twice);
    Ok(())
}
