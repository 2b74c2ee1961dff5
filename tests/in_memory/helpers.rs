//! Shared wiring for in-memory lifecycle integration tests.

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use crate::clock::ManualClock;
use leadline::lifecycle::{
    adapters::memory::{InMemoryAuditLog, InMemoryLeadRepository, RecordingNotificationChannel},
    config::LifecycleConfig,
    domain::{Lead, LeadStatus},
    ports::LeadRepository,
    services::{ActorContext, BulkTransitionCoordinator, LifecycleTransitionService},
};
use leadline::scope::{
    adapters::memory::InMemoryMembershipSource,
    domain::{ActorId, MembershipRecord, OrgId, Role},
    services::OrgScopeResolver,
};

/// Transition service over the in-memory adapters.
pub type MemoryService = LifecycleTransitionService<
    InMemoryLeadRepository,
    InMemoryAuditLog,
    RecordingNotificationChannel,
    ManualClock,
>;

/// Bulk coordinator over the in-memory adapters.
pub type MemoryCoordinator = BulkTransitionCoordinator<
    InMemoryLeadRepository,
    InMemoryAuditLog,
    RecordingNotificationChannel,
    ManualClock,
>;

/// Fixed instant the test clock starts at.
#[must_use]
pub fn start_of_quarter() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0)
        .single()
        .unwrap_or_default()
}

/// Fully wired lifecycle engine backed by in-memory adapters.
pub struct Engine {
    pub clock: Arc<ManualClock>,
    pub memberships: Arc<InMemoryMembershipSource>,
    pub resolver: OrgScopeResolver<InMemoryMembershipSource, ManualClock>,
    pub repository: Arc<InMemoryLeadRepository>,
    pub audit: Arc<InMemoryAuditLog>,
    pub notifier: Arc<RecordingNotificationChannel>,
    pub service: Arc<MemoryService>,
    pub bulk: MemoryCoordinator,
}

impl Engine {
    /// Wires an engine with `config` over the given membership source.
    #[must_use]
    pub fn with_memberships(config: LifecycleConfig, memberships: InMemoryMembershipSource) -> Self {
        let clock = Arc::new(ManualClock::new(start_of_quarter()));
        let memberships = Arc::new(memberships);
        let repository = Arc::new(InMemoryLeadRepository::new());
        let audit = Arc::new(InMemoryAuditLog::new());
        let notifier = Arc::new(RecordingNotificationChannel::new());
        let service = Arc::new(LifecycleTransitionService::new(
            Arc::clone(&repository),
            Arc::clone(&audit),
            Arc::clone(&notifier),
            Arc::clone(&clock),
            config,
        ));
        Self {
            resolver: OrgScopeResolver::new(Arc::clone(&memberships), Arc::clone(&clock)),
            bulk: BulkTransitionCoordinator::new(Arc::clone(&service)),
            clock,
            memberships,
            repository,
            audit,
            notifier,
            service,
        }
    }

    /// Wires an engine with `config` and an empty membership source.
    #[must_use]
    pub fn new(config: LifecycleConfig) -> Self {
        Self::with_memberships(config, InMemoryMembershipSource::new())
    }

    /// Registers a fresh actor in `org_id` and returns their identifier.
    pub fn enrol(&self, org_id: OrgId, role: Role) -> ActorId {
        let actor_id = ActorId::new();
        self.memberships
            .insert(MembershipRecord::new(actor_id, org_id, role));
        actor_id
    }

    /// Resolves the actor's scope the way a request handler would.
    ///
    /// # Errors
    ///
    /// Returns an error if the membership source fails.
    pub async fn context_for(&self, actor_id: ActorId) -> Result<ActorContext, eyre::Report> {
        let scope = self.resolver.resolve(actor_id).await?;
        Ok(ActorContext::new(actor_id, scope))
    }

    /// Stores a lead in `org_id` owned by `owner_id` at `status`.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository rejects the lead.
    pub async fn seed(
        &self,
        owner_id: ActorId,
        org_id: Option<OrgId>,
        status: LeadStatus,
    ) -> Result<Lead, eyre::Report> {
        let lead = Lead::new(owner_id, org_id, &*self.clock).with_status(status);
        self.repository.store(&lead).await?;
        Ok(lead)
    }

    /// Reads back the stored status of `lead`.
    ///
    /// # Errors
    ///
    /// Returns an error if the lead is missing or the lookup fails.
    pub async fn stored_status(&self, lead: &Lead) -> Result<LeadStatus, eyre::Report> {
        let stored = self
            .repository
            .find_by_id(lead.id())
            .await?
            .ok_or_else(|| eyre::eyre!("lead {} missing", lead.id()))?;
        Ok(stored.status())
    }
}
