//! `PostgreSQL` append-only audit sink.

use super::{
    models::{NewTransitionRow, TransitionRow},
    repository::LeadPgPool,
    schema::lead_transitions,
};
use crate::lifecycle::{
    domain::{
        DecisionReason, LeadId, LeadStatus, TransitionMetadata, TransitionRecord,
        TransitionRecordData, TransitionRecordId,
    },
    ports::{AuditSink, AuditSinkError, AuditSinkResult},
};
use crate::scope::domain::ActorId;
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL`-backed audit sink.
///
/// The adapter only ever inserts and selects; the table has no update path.
#[derive(Debug, Clone)]
pub struct PostgresAuditSink {
    pool: LeadPgPool,
}

impl PostgresAuditSink {
    /// Creates a new audit sink from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: LeadPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AuditSinkResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AuditSinkResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditSinkError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditSinkError::persistence)?
    }
}

#[async_trait]
impl AuditSink for PostgresAuditSink {
    async fn append(&self, record: &TransitionRecord) -> AuditSinkResult<()> {
        let record_id = record.id();
        let new_row = to_new_row(record)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(lead_transitions::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AuditSinkError::DuplicateRecord(record_id)
                    }
                    _ => AuditSinkError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn history(&self, lead_id: LeadId) -> AuditSinkResult<Vec<TransitionRecord>> {
        self.run_blocking(move |connection| {
            let rows = lead_transitions::table
                .filter(lead_transitions::lead_id.eq(lead_id.into_inner()))
                .order(lead_transitions::seq.asc())
                .select(TransitionRow::as_select())
                .load::<TransitionRow>(connection)
                .map_err(AuditSinkError::persistence)?;
            rows.into_iter().map(row_to_record).collect()
        })
        .await
    }
}

fn to_new_row(record: &TransitionRecord) -> AuditSinkResult<NewTransitionRow> {
    let reason = serde_json::to_value(record.reason()).map_err(AuditSinkError::persistence)?;
    Ok(NewTransitionRow {
        id: record.id().into_inner(),
        lead_id: record.lead_id().into_inner(),
        previous_status: record.previous_status().as_str().to_owned(),
        new_status: record.new_status().as_str().to_owned(),
        actor_id: record.actor_id().into_inner(),
        reason,
        metadata: record.metadata().to_value(),
        occurred_at: record.occurred_at(),
    })
}

fn row_to_record(row: TransitionRow) -> AuditSinkResult<TransitionRecord> {
    let previous_status =
        LeadStatus::try_from(row.previous_status.as_str()).map_err(AuditSinkError::persistence)?;
    let new_status =
        LeadStatus::try_from(row.new_status.as_str()).map_err(AuditSinkError::persistence)?;
    let reason =
        serde_json::from_value::<DecisionReason>(row.reason).map_err(AuditSinkError::persistence)?;
    let metadata =
        serde_json::from_value::<TransitionMetadata>(row.metadata).map_err(AuditSinkError::persistence)?;

    Ok(TransitionRecord::new(TransitionRecordData {
        id: TransitionRecordId::from_uuid(row.id),
        lead_id: LeadId::from_uuid(row.lead_id),
        previous_status,
        new_status,
        actor_id: ActorId::from_uuid(row.actor_id),
        reason,
        occurred_at: row.occurred_at,
        metadata,
    }))
}
