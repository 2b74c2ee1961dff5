//! `PostgreSQL` repository implementation for lead storage.

use super::{
    models::{LeadRow, NewLeadRow},
    schema::leads,
};
use crate::lifecycle::{
    domain::{Lead, LeadId, LeadStatus, PersistedLeadData},
    ports::{LeadRepository, LeadRepositoryError, LeadRepositoryResult, StatusUpdate},
};
use crate::scope::domain::{ActorId, OrgId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by lifecycle adapters.
pub type LeadPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed lead repository.
#[derive(Debug, Clone)]
pub struct PostgresLeadRepository {
    pool: LeadPgPool,
}

impl PostgresLeadRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LeadPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> LeadRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> LeadRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(LeadRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(LeadRepositoryError::persistence)?
    }
}

#[async_trait]
impl LeadRepository for PostgresLeadRepository {
    async fn store(&self, lead: &Lead) -> LeadRepositoryResult<()> {
        let lead_id = lead.id();
        let new_row = to_new_row(lead)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(leads::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        LeadRepositoryError::DuplicateLead(lead_id)
                    }
                    _ => LeadRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn find_by_id(&self, id: LeadId) -> LeadRepositoryResult<Option<Lead>> {
        self.run_blocking(move |connection| {
            find_lead_row(connection, id)?.map(row_to_lead).transpose()
        })
        .await
    }

    async fn compare_and_set_status(
        &self,
        id: LeadId,
        expected: LeadStatus,
        target: LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> LeadRepositoryResult<StatusUpdate> {
        self.run_blocking(move |connection| {
            // The status predicate makes the check and the write a single
            // statement; no row lock is held across round trips.
            let updated = diesel::update(
                leads::table
                    .filter(leads::id.eq(id.into_inner()))
                    .filter(leads::status.eq(expected.as_str())),
            )
            .set((
                leads::status.eq(target.as_str()),
                leads::version.eq(leads::version + 1_i64),
                leads::updated_at.eq(updated_at),
            ))
            .returning(LeadRow::as_returning())
            .get_result::<LeadRow>(connection)
            .optional()
            .map_err(LeadRepositoryError::persistence)?;

            if let Some(row) = updated {
                return Ok(StatusUpdate::Applied(row_to_lead(row)?));
            }

            let current = find_lead_row(connection, id)?.ok_or(LeadRepositoryError::NotFound(id))?;
            let actual =
                LeadStatus::try_from(current.status.as_str()).map_err(LeadRepositoryError::persistence)?;
            Ok(StatusUpdate::Conflict { actual })
        })
        .await
    }
}

fn find_lead_row(connection: &mut PgConnection, id: LeadId) -> LeadRepositoryResult<Option<LeadRow>> {
    leads::table
        .filter(leads::id.eq(id.into_inner()))
        .select(LeadRow::as_select())
        .first::<LeadRow>(connection)
        .optional()
        .map_err(LeadRepositoryError::persistence)
}

fn to_new_row(lead: &Lead) -> LeadRepositoryResult<NewLeadRow> {
    let version = i64::try_from(lead.version()).map_err(LeadRepositoryError::persistence)?;
    Ok(NewLeadRow {
        id: lead.id().into_inner(),
        owner_id: lead.owner_id().into_inner(),
        org_id: lead.org_id().map(OrgId::into_inner),
        status: lead.status().as_str().to_owned(),
        version,
        created_at: lead.created_at(),
        updated_at: lead.updated_at(),
    })
}

fn row_to_lead(row: LeadRow) -> LeadRepositoryResult<Lead> {
    let LeadRow {
        id,
        owner_id,
        org_id,
        status: persisted_status,
        version: persisted_version,
        created_at,
        updated_at,
    } = row;

    let status =
        LeadStatus::try_from(persisted_status.as_str()).map_err(LeadRepositoryError::persistence)?;
    let version = u64::try_from(persisted_version).map_err(LeadRepositoryError::persistence)?;

    Ok(Lead::from_persisted(PersistedLeadData {
        id: LeadId::from_uuid(id),
        owner_id: ActorId::from_uuid(owner_id),
        org_id: org_id.map(OrgId::from_uuid),
        status,
        version,
        created_at,
        updated_at,
    }))
}
