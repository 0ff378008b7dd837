//! `PostgreSQL` repository implementation for appointment storage.

use super::{
    models::{AppointmentRow, NewAppointmentRow},
    schema::appointments,
};
use crate::access::{BrokerScope, StaffId};
use crate::client::domain::ClientId;
use crate::scheduling::{
    domain::{
        Appointment, AppointmentId, AppointmentStatus, AppointmentTitle,
        PersistedAppointmentData,
    },
    ports::{AppointmentRepository, AppointmentRepositoryError, AppointmentRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by appointment adapters.
pub type AppointmentPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed appointment repository.
#[derive(Debug, Clone)]
pub struct PostgresAppointmentRepository {
    pool: AppointmentPgPool,
}

impl PostgresAppointmentRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AppointmentPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AppointmentRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AppointmentRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            // Pool exhaustion and checkout timeouts are transient; callers
            // may retry pure reads.
            let mut connection = pool.get().map_err(AppointmentRepositoryError::transient)?;
            f(&mut connection)
        })
        .await
        .map_err(AppointmentRepositoryError::persistence)?
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepository {
    async fn store(&self, appointment: &Appointment) -> AppointmentRepositoryResult<()> {
        let appointment_id = appointment.id();
        let new_row = to_new_row(appointment);

        self.run_blocking(move |connection| {
            diesel::insert_into(appointments::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AppointmentRepositoryError::DuplicateAppointment(appointment_id)
                    }
                    _ => AppointmentRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update(&self, appointment: &Appointment) -> AppointmentRepositoryResult<()> {
        let appointment_id = appointment.id();
        let scheduled_at = appointment.scheduled_at();
        let status = appointment.status().as_str().to_owned();
        let updated_at = appointment.updated_at();

        self.run_blocking(move |connection| {
            let affected = diesel::update(
                appointments::table.filter(appointments::id.eq(appointment_id.into_inner())),
            )
            .set((
                appointments::scheduled_at.eq(scheduled_at),
                appointments::status.eq(status),
                appointments::updated_at.eq(updated_at),
            ))
            .execute(connection)
            .map_err(AppointmentRepositoryError::persistence)?;

            if affected == 0 {
                return Err(AppointmentRepositoryError::NotFound(appointment_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_by_id(
        &self,
        id: AppointmentId,
    ) -> AppointmentRepositoryResult<Option<Appointment>> {
        self.run_blocking(move |connection| {
            let row = appointments::table
                .filter(appointments::id.eq(id.into_inner()))
                .select(AppointmentRow::as_select())
                .first::<AppointmentRow>(connection)
                .optional()
                .map_err(AppointmentRepositoryError::persistence)?;
            row.map(row_to_appointment).transpose()
        })
        .await
    }

    async fn delete_by_client(&self, client_id: ClientId) -> AppointmentRepositoryResult<u64> {
        self.run_blocking(move |connection| {
            let removed = diesel::delete(
                appointments::table.filter(appointments::client_id.eq(client_id.into_inner())),
            )
            .execute(connection)
            .map_err(AppointmentRepositoryError::persistence)?;
            u64::try_from(removed).map_err(AppointmentRepositoryError::persistence)
        })
        .await
    }

    async fn list_scheduled_before(
        &self,
        instant: DateTime<Utc>,
        scope: BrokerScope,
    ) -> AppointmentRepositoryResult<Vec<Appointment>> {
        self.run_blocking(move |connection| {
            let mut query = appointments::table
                .select(AppointmentRow::as_select())
                .filter(appointments::status.eq(AppointmentStatus::Scheduled.as_str()))
                .filter(appointments::scheduled_at.lt(instant))
                .into_boxed();
            if let BrokerScope::Only(broker_id) = scope {
                query = query.filter(appointments::broker_id.eq(broker_id.into_inner()));
            }
            let rows = query
                .order(appointments::scheduled_at.asc())
                .load::<AppointmentRow>(connection)
                .map_err(AppointmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_appointment).collect()
        })
        .await
    }

    async fn list_scheduled_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
        scope: BrokerScope,
    ) -> AppointmentRepositoryResult<Vec<Appointment>> {
        self.run_blocking(move |connection| {
            let mut query = appointments::table
                .select(AppointmentRow::as_select())
                .filter(appointments::status.eq(AppointmentStatus::Scheduled.as_str()))
                .filter(appointments::scheduled_at.ge(from))
                .filter(appointments::scheduled_at.le(until))
                .into_boxed();
            if let BrokerScope::Only(broker_id) = scope {
                query = query.filter(appointments::broker_id.eq(broker_id.into_inner()));
            }
            let rows = query
                .order(appointments::scheduled_at.asc())
                .load::<AppointmentRow>(connection)
                .map_err(AppointmentRepositoryError::persistence)?;
            rows.into_iter().map(row_to_appointment).collect()
        })
        .await
    }
}

fn to_new_row(appointment: &Appointment) -> NewAppointmentRow {
    NewAppointmentRow {
        id: appointment.id().into_inner(),
        client_id: appointment.client_id().map(ClientId::into_inner),
        broker_id: appointment.broker_id().into_inner(),
        scheduled_at: appointment.scheduled_at(),
        status: appointment.status().as_str().to_owned(),
        title: appointment.title().as_str().to_owned(),
        description: appointment.description().map(str::to_owned),
        created_at: appointment.created_at(),
        updated_at: appointment.updated_at(),
    }
}

fn row_to_appointment(row: AppointmentRow) -> AppointmentRepositoryResult<Appointment> {
    let status = AppointmentStatus::try_from(row.status.as_str())
        .map_err(AppointmentRepositoryError::persistence)?;
    let title =
        AppointmentTitle::new(row.title).map_err(AppointmentRepositoryError::persistence)?;

    let data = PersistedAppointmentData {
        id: AppointmentId::from_uuid(row.id),
        client_id: row.client_id.map(ClientId::from_uuid),
        broker_id: StaffId::from_uuid(row.broker_id),
        scheduled_at: row.scheduled_at,
        status,
        title,
        description: row.description,
        created_at: row.created_at,
        updated_at: row.updated_at,
    };
    Ok(Appointment::from_persisted(data))
}
