//! Lead aggregate root.

use super::{LeadId, LeadStatus};
use crate::scope::domain::{ActorId, AuthorizationScope, OrgId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// A sales lead carrying the governed pipeline status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    id: LeadId,
    owner_id: ActorId,
    org_id: Option<OrgId>,
    status: LeadStatus,
    version: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedLeadData {
    /// Persisted lead identifier.
    pub id: LeadId,
    /// Owning actor.
    pub owner_id: ActorId,
    /// Owning organization, if the lead is shared with one.
    pub org_id: Option<OrgId>,
    /// Persisted pipeline status.
    pub status: LeadStatus,
    /// Persisted concurrency version.
    pub version: u64,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Lead {
    /// Creates a new lead in [`LeadStatus::New`].
    #[must_use]
    pub fn new(owner_id: ActorId, org_id: Option<OrgId>, clock: &impl Clock) -> Self {
        let timestamp = clock.utc();
        Self {
            id: LeadId::new(),
            owner_id,
            org_id,
            status: LeadStatus::New,
            version: 0,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a lead from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedLeadData) -> Self {
        Self {
            id: data.id,
            owner_id: data.owner_id,
            org_id: data.org_id,
            status: data.status,
            version: data.version,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns a copy of this lead in `status`, for seeding fixtures and
    /// imports that bypass the transition service.
    #[must_use]
    pub const fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the lead identifier.
    #[must_use]
    pub const fn id(&self) -> LeadId {
        self.id
    }

    /// Returns the owning actor.
    #[must_use]
    pub const fn owner_id(&self) -> ActorId {
        self.owner_id
    }

    /// Returns the owning organization, if any.
    #[must_use]
    pub const fn org_id(&self) -> Option<OrgId> {
        self.org_id
    }

    /// Returns the pipeline status.
    #[must_use]
    pub const fn status(&self) -> LeadStatus {
        self.status
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns `true` when the actor may see this lead: it either owns the
    /// lead or acts in the organization the lead belongs to.
    #[must_use]
    pub fn is_visible_to(&self, actor_id: ActorId, scope: &AuthorizationScope) -> bool {
        if self.owner_id == actor_id {
            return true;
        }
        self.org_id
            .is_some_and(|org_id| scope.org_id() == Some(org_id))
    }

    /// Applies a committed status change, bumping the version.
    ///
    /// Only persistence adapters call this, after their compare-and-swap
    /// check has passed.
    pub fn apply_status(&mut self, status: LeadStatus, at: DateTime<Utc>) {
        self.status = status;
        self.version = self.version.saturating_add(1);
        self.updated_at = at;
    }
}
