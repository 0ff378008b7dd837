//! In-memory repository for appointment scheduling tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::access::BrokerScope;
use crate::client::domain::ClientId;
use crate::scheduling::{
    domain::{Appointment, AppointmentId, AppointmentStatus},
    ports::{AppointmentRepository, AppointmentRepositoryError, AppointmentRepositoryResult},
};

/// Thread-safe in-memory appointment repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentRepository {
    state: Arc<RwLock<InMemoryAppointmentState>>,
}

#[derive(Debug, Default)]
struct InMemoryAppointmentState {
    appointments: HashMap<AppointmentId, Appointment>,
}

impl InMemoryAppointmentRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> AppointmentRepositoryError {
    AppointmentRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Collects `Scheduled` appointments matching the window and scope,
/// ascending by scheduled instant.
fn scheduled_window(
    state: &InMemoryAppointmentState,
    scope: BrokerScope,
    window: impl Fn(DateTime<Utc>) -> bool,
) -> Vec<Appointment> {
    let mut matching: Vec<Appointment> = state
        .appointments
        .values()
        .filter(|appointment| {
            appointment.status() == AppointmentStatus::Scheduled
                && scope.matches(Some(appointment.broker_id()))
                && window(appointment.scheduled_at())
        })
        .cloned()
        .collect();
    matching.sort_by_key(|appointment| (appointment.scheduled_at(), appointment.id().into_inner()));
    matching
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn store(&self, appointment: &Appointment) -> AppointmentRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.appointments.contains_key(&appointment.id()) {
            return Err(AppointmentRepositoryError::DuplicateAppointment(
                appointment.id(),
            ));
        }
        state.appointments.insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn update(&self, appointment: &Appointment) -> AppointmentRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.appointments.contains_key(&appointment.id()) {
            return Err(AppointmentRepositoryError::NotFound(appointment.id()));
        }
        state.appointments.insert(appointment.id(), appointment.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: AppointmentId,
    ) -> AppointmentRepositoryResult<Option<Appointment>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.appointments.get(&id).cloned())
    }

    async fn delete_by_client(&self, client_id: ClientId) -> AppointmentRepositoryResult<u64> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let before = state.appointments.len();
        state
            .appointments
            .retain(|_, appointment| appointment.client_id() != Some(client_id));
        let removed = before - state.appointments.len();
        u64::try_from(removed).map_err(AppointmentRepositoryError::persistence)
    }

    async fn list_scheduled_before(
        &self,
        instant: DateTime<Utc>,
        scope: BrokerScope,
    ) -> AppointmentRepositoryResult<Vec<Appointment>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(scheduled_window(&state, scope, |scheduled_at| {
            scheduled_at < instant
        }))
    }

    async fn list_scheduled_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        scope: BrokerScope,
    ) -> AppointmentRepositoryResult<Vec<Appointment>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(scheduled_window(&state, scope, |scheduled_at| {
            scheduled_at >= from && scheduled_at <= until
        }))
    }
}
