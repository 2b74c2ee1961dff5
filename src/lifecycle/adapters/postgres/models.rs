//! Diesel row models for lead persistence.

use super::schema::{lead_transitions, leads};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for lead records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = leads)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct LeadRow {
    /// Lead identifier.
    pub id: uuid::Uuid,
    /// Owning actor.
    pub owner_id: uuid::Uuid,
    /// Owning organization.
    pub org_id: Option<uuid::Uuid>,
    /// Pipeline status.
    pub status: String,
    /// Concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for lead records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = leads)]
pub struct NewLeadRow {
    /// Lead identifier.
    pub id: uuid::Uuid,
    /// Owning actor.
    pub owner_id: uuid::Uuid,
    /// Owning organization.
    pub org_id: Option<uuid::Uuid>,
    /// Pipeline status.
    pub status: String,
    /// Concurrency version.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for transition records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lead_transitions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TransitionRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Lead that changed.
    pub lead_id: uuid::Uuid,
    /// Status before the change.
    pub previous_status: String,
    /// Status after the change.
    pub new_status: String,
    /// Actor that performed the change.
    pub actor_id: uuid::Uuid,
    /// Policy decision reason.
    pub reason: Value,
    /// Caller metadata.
    pub metadata: Value,
    /// Commit timestamp.
    pub occurred_at: DateTime<Utc>,
}

/// Insert model for transition records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = lead_transitions)]
pub struct NewTransitionRow {
    /// Record identifier.
    pub id: uuid::Uuid,
    /// Lead that changed.
    pub lead_id: uuid::Uuid,
    /// Status before the change.
    pub previous_status: String,
    /// Status after the change.
    pub new_status: String,
    /// Actor that performed the change.
    pub actor_id: uuid::Uuid,
    /// Policy decision reason.
    pub reason: Value,
    /// Caller metadata.
    pub metadata: Value,
    /// Commit timestamp.
    pub occurred_at: DateTime<Utc>,
}
