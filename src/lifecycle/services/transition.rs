//! Single-lead transition orchestration.

use crate::lifecycle::{
    config::LifecycleConfig,
    domain::{
        DecisionReason, IdempotencyKey, Lead, LeadId, LeadStatus, PolicyDecision, TransitionMetadata,
        TransitionPolicy, TransitionRecord, TransitionRecordData, TransitionRecordId,
        TransitionViolation,
    },
    ports::{AuditSink, LeadRepository, LeadRepositoryError, NotificationChannel, StatusUpdate},
    services::IdempotencyGuard,
};
use crate::scope::domain::{ActorId, AuthorizationScope, LicenseStatus};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The actor a request runs on behalf of, with its resolved scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    actor_id: Option<ActorId>,
    scope: AuthorizationScope,
}

impl ActorContext {
    /// Creates a context for an authenticated actor.
    #[must_use]
    pub const fn new(actor_id: ActorId, scope: AuthorizationScope) -> Self {
        Self {
            actor_id: Some(actor_id),
            scope,
        }
    }

    /// Creates a context without an authenticated actor.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            actor_id: None,
            scope: AuthorizationScope::unaffiliated(),
        }
    }

    /// Returns the authenticated actor, if any.
    #[must_use]
    pub const fn actor_id(&self) -> Option<ActorId> {
        self.actor_id
    }

    /// Returns the resolved scope.
    #[must_use]
    pub const fn scope(&self) -> &AuthorizationScope {
        &self.scope
    }

    /// Checks that the context may mutate leads at all, returning the actor.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Unauthorized`] without an actor and
    /// [`TransitionError::LicenseBlocked`] when the scope's license does not
    /// permit mutations.
    pub fn authorize_mutation(&self) -> TransitionResult<ActorId> {
        let Some(actor_id) = self.actor_id else {
            return Err(TransitionError::Unauthorized);
        };
        let license = self.scope.license_status();
        if !license.permits_mutation() {
            return Err(TransitionError::LicenseBlocked(license));
        }
        Ok(actor_id)
    }
}

/// Request payload for moving one lead to a new status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRequest {
    lead_id: LeadId,
    target: LeadStatus,
    idempotency_key: Option<IdempotencyKey>,
    metadata: TransitionMetadata,
}

impl TransitionRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(lead_id: LeadId, target: LeadStatus) -> Self {
        Self {
            lead_id,
            target,
            idempotency_key: None,
            metadata: TransitionMetadata::new(),
        }
    }

    /// Sets the idempotency key.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Sets caller metadata recorded in the audit trail.
    #[must_use]
    pub fn with_metadata(mut self, metadata: TransitionMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the target lead.
    #[must_use]
    pub const fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    /// Returns the requested status.
    #[must_use]
    pub const fn target(&self) -> LeadStatus {
        self.target
    }
}

/// Identity a keyed transition is deduplicated on.
///
/// A replay must come from the same actor with the same key, lead, and
/// target; a key reused with different arguments is a new request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplayKey {
    actor_id: ActorId,
    key: IdempotencyKey,
    lead_id: LeadId,
    target: LeadStatus,
}

impl ReplayKey {
    /// Binds `key` to the actor and arguments of one request.
    #[must_use]
    pub const fn new(
        actor_id: ActorId,
        key: IdempotencyKey,
        lead_id: LeadId,
        target: LeadStatus,
    ) -> Self {
        Self {
            actor_id,
            key,
            lead_id,
            target,
        }
    }
}

/// Result of a committed transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionOutcome {
    lead: Lead,
    record: TransitionRecord,
}

impl TransitionOutcome {
    /// Returns the lead as committed.
    #[must_use]
    pub const fn lead(&self) -> &Lead {
        &self.lead
    }

    /// Returns the committed status.
    #[must_use]
    pub const fn status(&self) -> LeadStatus {
        self.lead.status()
    }

    /// Returns the audit record of the change.
    #[must_use]
    pub const fn record(&self) -> &TransitionRecord {
        &self.record
    }
}

/// Copyable classification of [`TransitionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionErrorKind {
    /// No authenticated actor.
    Unauthorized,
    /// Lead missing or not visible to the actor.
    NotFound,
    /// Policy rejected the move.
    InvalidTransition,
    /// A concurrent update won the compare-and-swap.
    Conflict,
    /// The scope's license does not permit mutations.
    LicenseBlocked,
    /// Unexpected persistence failure.
    Internal,
}

impl TransitionErrorKind {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::NotFound => "not_found",
            Self::InvalidTransition => "invalid_transition",
            Self::Conflict => "conflict",
            Self::LicenseBlocked => "license_blocked",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for TransitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service-level errors for lead transitions.
#[derive(Debug, Clone, Error)]
pub enum TransitionError {
    /// No authenticated actor.
    #[error("no authenticated actor")]
    Unauthorized,

    /// Lead missing or outside the actor's visibility.
    #[error("lead {0} not found")]
    NotFound(LeadId),

    /// Policy rejected the move; nothing was written.
    #[error("lead {lead_id} cannot move from {from} to {to}: {violation}")]
    InvalidTransition {
        /// Target lead.
        lead_id: LeadId,
        /// Status at read time.
        from: LeadStatus,
        /// Requested status.
        to: LeadStatus,
        /// Ordering rule broken.
        violation: TransitionViolation,
    },

    /// Another writer changed the status first; retry with fresh state.
    #[error("lead {lead_id} changed concurrently: expected {expected}, found {actual}")]
    Conflict {
        /// Target lead.
        lead_id: LeadId,
        /// Status read before the write.
        expected: LeadStatus,
        /// Status found at write time.
        actual: LeadStatus,
    },

    /// The scope's license does not permit mutations.
    #[error("mutations blocked by license status {0}")]
    LicenseBlocked(LicenseStatus),

    /// Unexpected persistence failure.
    #[error(transparent)]
    Internal(#[from] LeadRepositoryError),
}

impl TransitionError {
    /// Returns the error classification.
    #[must_use]
    pub const fn kind(&self) -> TransitionErrorKind {
        match self {
            Self::Unauthorized => TransitionErrorKind::Unauthorized,
            Self::NotFound(_) => TransitionErrorKind::NotFound,
            Self::InvalidTransition { .. } => TransitionErrorKind::InvalidTransition,
            Self::Conflict { .. } => TransitionErrorKind::Conflict,
            Self::LicenseBlocked(_) => TransitionErrorKind::LicenseBlocked,
            Self::Internal(_) => TransitionErrorKind::Internal,
        }
    }
}

/// Result type for transition operations.
pub type TransitionResult<T> = Result<T, TransitionError>;

/// Executes one lead's transition end to end: validate, persist, audit,
/// notify.
pub struct LifecycleTransitionService<R, A, N, C>
where
    R: LeadRepository,
    A: AuditSink,
    N: NotificationChannel,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    audit: Arc<A>,
    notifier: Arc<N>,
    clock: Arc<C>,
    config: LifecycleConfig,
    guard: IdempotencyGuard<ReplayKey, TransitionOutcome, C>,
}

impl<R, A, N, C> LifecycleTransitionService<R, A, N, C>
where
    R: LeadRepository,
    A: AuditSink,
    N: NotificationChannel,
    C: Clock + Send + Sync,
{
    /// Creates a new transition service.
    #[must_use]
    pub fn new(
        repository: Arc<R>,
        audit: Arc<A>,
        notifier: Arc<N>,
        clock: Arc<C>,
        config: LifecycleConfig,
    ) -> Self {
        let guard = IdempotencyGuard::new(config.idempotency, Arc::clone(&clock));
        Self {
            repository,
            audit,
            notifier,
            clock,
            config,
            guard,
        }
    }

    /// Returns the configuration the service runs with.
    #[must_use]
    pub const fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Returns the idempotency guard shared by every request.
    #[must_use]
    pub const fn idempotency(&self) -> &IdempotencyGuard<ReplayKey, TransitionOutcome, C> {
        &self.guard
    }

    /// Moves one lead to the requested status.
    ///
    /// A repeated call by the same actor with the key and arguments of an
    /// already committed request returns the cached outcome once the lead is
    /// confirmed visible, without writing again.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::Unauthorized`] or
    /// [`TransitionError::LicenseBlocked`] before the store is read,
    /// [`TransitionError::NotFound`] when the lead is missing or not visible,
    /// [`TransitionError::InvalidTransition`] when the policy rejects the
    /// move, [`TransitionError::Conflict`] when a concurrent writer won, and
    /// [`TransitionError::Internal`] for persistence failures.
    pub async fn transition(
        &self,
        actor: &ActorContext,
        request: TransitionRequest,
    ) -> TransitionResult<TransitionOutcome> {
        let actor_id = actor.authorize_mutation()?;
        let scope = actor.scope();
        let policy = TransitionPolicy::new(self.config.enforcement_mode);

        let TransitionRequest {
            lead_id,
            target,
            idempotency_key,
            metadata,
        } = request;
        let replay_key =
            idempotency_key.map(|key| ReplayKey::new(actor_id, key, lead_id, target));

        let lead = self
            .repository
            .find_by_id(lead_id)
            .await?
            .filter(|candidate| candidate.is_visible_to(actor_id, scope))
            .ok_or(TransitionError::NotFound(lead_id))?;

        if let Some(cached) = replay_key.as_ref().and_then(|key| self.guard.cached(key)) {
            tracing::debug!(
                lead_id = %lead_id,
                "idempotency key already committed; returning cached outcome"
            );
            return Ok(cached);
        }

        let can_override = self.config.override_roles.grants(scope.role());
        let decision = policy.evaluate(lead.status(), target, can_override);
        tracing::debug!(
            lead_id = %lead_id,
            from = %lead.status(),
            to = %target,
            can_override,
            mode = %policy.mode(),
            allowed = decision.is_allowed(),
            "evaluated transition policy"
        );
        if let DecisionReason::Rejected(violation) = decision.reason() {
            return Err(TransitionError::InvalidTransition {
                lead_id,
                from: lead.status(),
                to: target,
                violation,
            });
        }
        if decision.requires_logging() {
            tracing::warn!(
                lead_id = %lead_id,
                actor_id = %actor_id,
                from = %lead.status(),
                to = %target,
                violation = ?decision.violation(),
                "lead transition violates pipeline ordering; permitted in log_only mode"
            );
        }

        self.guard
            .run(replay_key.as_ref(), || {
                self.commit(actor_id, &lead, target, decision, metadata)
            })
            .await
    }

    async fn commit(
        &self,
        actor_id: ActorId,
        lead: &Lead,
        target: LeadStatus,
        decision: PolicyDecision,
        metadata: TransitionMetadata,
    ) -> TransitionResult<TransitionOutcome> {
        let occurred_at = self.clock.utc();
        let update = self
            .repository
            .compare_and_set_status(lead.id(), lead.status(), target, occurred_at)
            .await
            .map_err(|err| match err {
                LeadRepositoryError::NotFound(id) => TransitionError::NotFound(id),
                other => TransitionError::Internal(other),
            })?;

        let committed = match update {
            StatusUpdate::Applied(committed) => committed,
            StatusUpdate::Conflict { actual } => {
                tracing::debug!(
                    lead_id = %lead.id(),
                    expected = %lead.status(),
                    actual = %actual,
                    "lost compare-and-swap race"
                );
                return Err(TransitionError::Conflict {
                    lead_id: lead.id(),
                    expected: lead.status(),
                    actual,
                });
            }
        };

        let record = TransitionRecord::new(TransitionRecordData {
            id: TransitionRecordId::new(),
            lead_id: committed.id(),
            previous_status: lead.status(),
            new_status: committed.status(),
            actor_id,
            reason: decision.reason(),
            occurred_at,
            metadata,
        });
        tracing::info!(
            lead_id = %committed.id(),
            actor_id = %actor_id,
            from = %record.previous_status(),
            to = %record.new_status(),
            version = committed.version(),
            "lead transition committed"
        );

        if let Err(err) = self.audit.append(&record).await {
            tracing::warn!(
                lead_id = %committed.id(),
                record_id = %record.id(),
                error = %err,
                "failed to append transition audit record"
            );
        }
        if let Err(err) = self
            .notifier
            .send(committed.owner_id(), &record.to_event())
            .await
        {
            tracing::warn!(
                lead_id = %committed.id(),
                owner_id = %committed.owner_id(),
                error = %err,
                "failed to notify lead owner"
            );
        }

        Ok(TransitionOutcome {
            lead: committed,
            record,
        })
    }
}
