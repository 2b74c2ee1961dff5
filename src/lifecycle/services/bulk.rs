//! Bulk fan-out of one transition across many leads.

use super::transition::{
    ActorContext, LifecycleTransitionService, TransitionError, TransitionErrorKind,
    TransitionRequest,
};
use crate::lifecycle::{
    domain::{IdempotencyKey, LeadId, LeadStatus, TransitionMetadata},
    ports::{AuditSink, LeadRepository, NotificationChannel},
};
use crate::scope::domain::LicenseStatus;
use futures::stream::{self, StreamExt};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for moving many leads to one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkTransitionRequest {
    lead_ids: Vec<LeadId>,
    target: LeadStatus,
    idempotency_key: Option<IdempotencyKey>,
    metadata: TransitionMetadata,
}

impl BulkTransitionRequest {
    /// Creates a request for `lead_ids`, processed in the given order.
    #[must_use]
    pub fn new(lead_ids: impl IntoIterator<Item = LeadId>, target: LeadStatus) -> Self {
        Self {
            lead_ids: lead_ids.into_iter().collect(),
            target,
            idempotency_key: None,
            metadata: TransitionMetadata::new(),
        }
    }

    /// Sets the batch idempotency key, applied to every item.
    #[must_use]
    pub fn with_idempotency_key(mut self, key: IdempotencyKey) -> Self {
        self.idempotency_key = Some(key);
        self
    }

    /// Sets caller metadata recorded for every item.
    #[must_use]
    pub fn with_metadata(mut self, metadata: TransitionMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the requested leads.
    #[must_use]
    pub fn lead_ids(&self) -> &[LeadId] {
        &self.lead_ids
    }
}

/// Outcome of one item in a bulk request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BulkItemStatus {
    /// The transition committed.
    Succeeded {
        /// Committed status.
        status: LeadStatus,
    },
    /// The transition failed; other items were unaffected.
    Failed {
        /// Failure classification.
        reason: TransitionErrorKind,
        /// Human-readable detail.
        message: String,
    },
}

/// Per-lead entry of a bulk result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemOutcome {
    /// Lead the entry refers to.
    pub lead_id: LeadId,
    /// What happened to it.
    #[serde(flatten)]
    pub status: BulkItemStatus,
}

impl BulkItemOutcome {
    fn from_result(lead_id: LeadId, result: Result<LeadStatus, TransitionError>) -> Self {
        let status = match result {
            Ok(status) => BulkItemStatus::Succeeded { status },
            Err(err) => BulkItemStatus::Failed {
                reason: err.kind(),
                message: err.to_string(),
            },
        };
        Self { lead_id, status }
    }

    /// Returns `true` when the item committed.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.status, BulkItemStatus::Succeeded { .. })
    }

    /// Returns the failure classification, if the item failed.
    #[must_use]
    pub const fn failure(&self) -> Option<TransitionErrorKind> {
        match self.status {
            BulkItemStatus::Succeeded { .. } => None,
            BulkItemStatus::Failed { reason, .. } => Some(reason),
        }
    }
}

/// Aggregate result of a bulk request. Partial success is a normal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkTransitionResult {
    /// Number of distinct leads processed.
    pub total: usize,
    /// Number of items committed.
    pub succeeded: usize,
    /// Number of items that failed.
    pub failed: usize,
    /// Per-item outcomes in request order.
    pub items: Vec<BulkItemOutcome>,
}

impl BulkTransitionResult {
    fn from_items(items: Vec<BulkItemOutcome>) -> Self {
        let succeeded = items.iter().filter(|item| item.is_success()).count();
        let total = items.len();
        Self {
            total,
            succeeded,
            failed: total - succeeded,
            items,
        }
    }

    /// Iterates over failed items and their classification.
    pub fn failures(&self) -> impl Iterator<Item = (LeadId, TransitionErrorKind)> + '_ {
        self.items
            .iter()
            .filter_map(|item| item.failure().map(|reason| (item.lead_id, reason)))
    }
}

/// Errors that reject a bulk request as a whole, before any item runs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BulkTransitionError {
    /// More items than the configured maximum.
    #[error("batch of {requested} exceeds the maximum of {max}")]
    BatchTooLarge {
        /// Items requested.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    /// No authenticated actor.
    #[error("no authenticated actor")]
    Unauthorized,

    /// The scope's license does not permit mutations.
    #[error("mutations blocked by license status {0}")]
    LicenseBlocked(LicenseStatus),
}

/// Result type for bulk operations.
pub type BulkResult<T> = Result<T, BulkTransitionError>;

/// Fans one transition out across many leads, collecting per-item results.
///
/// Items never share atomicity: an item failure is recorded and processing
/// continues, and committed items are never rolled back.
pub struct BulkTransitionCoordinator<R, A, N, C>
where
    R: LeadRepository,
    A: AuditSink,
    N: NotificationChannel,
    C: Clock + Send + Sync,
{
    service: Arc<LifecycleTransitionService<R, A, N, C>>,
}

impl<R, A, N, C> BulkTransitionCoordinator<R, A, N, C>
where
    R: LeadRepository,
    A: AuditSink,
    N: NotificationChannel,
    C: Clock + Send + Sync,
{
    /// Creates a coordinator over a transition service.
    #[must_use]
    pub const fn new(service: Arc<LifecycleTransitionService<R, A, N, C>>) -> Self {
        Self { service }
    }

    /// Runs the transition for every requested lead.
    ///
    /// Repeated lead ids are processed once, at their first position. Items
    /// are dispatched in request order with at most the configured number in
    /// flight, and outcomes are reported in request order. Replays of a keyed
    /// batch deduplicate per lead, since each item's replay identity includes
    /// its lead id.
    ///
    /// # Errors
    ///
    /// Returns [`BulkTransitionError`] only for request-level problems
    /// detected before any item is processed. Item failures are reported in
    /// the result.
    pub async fn transition_all(
        &self,
        actor: &ActorContext,
        request: BulkTransitionRequest,
    ) -> BulkResult<BulkTransitionResult> {
        let config = self.service.config();
        let requested = request.lead_ids.len();
        if requested > config.max_batch_size {
            return Err(BulkTransitionError::BatchTooLarge {
                requested,
                max: config.max_batch_size,
            });
        }
        actor.authorize_mutation().map_err(|err| match err {
            TransitionError::LicenseBlocked(license) => BulkTransitionError::LicenseBlocked(license),
            _ => BulkTransitionError::Unauthorized,
        })?;

        let BulkTransitionRequest {
            lead_ids,
            target,
            idempotency_key,
            metadata,
        } = request;

        let mut seen = HashSet::with_capacity(requested);
        let items: Vec<TransitionRequest> = lead_ids
            .into_iter()
            .filter(|lead_id| seen.insert(*lead_id))
            .map(|lead_id| {
                let mut item = TransitionRequest::new(lead_id, target).with_metadata(metadata.clone());
                if let Some(batch_key) = idempotency_key.as_ref() {
                    item = item.with_idempotency_key(batch_key.clone());
                }
                item
            })
            .collect();
        if items.len() < requested {
            tracing::debug!(
                requested,
                distinct = items.len(),
                "dropped repeated lead ids from bulk request"
            );
        }

        let outcomes = stream::iter(items)
            .map(|item| async move {
                let lead_id = item.lead_id();
                let result = self
                    .service
                    .transition(actor, item)
                    .await
                    .map(|outcome| outcome.status());
                BulkItemOutcome::from_result(lead_id, result)
            })
            .buffered(config.bulk_concurrency.max(1))
            .collect::<Vec<_>>()
            .await;

        let result = BulkTransitionResult::from_items(outcomes);
        tracing::info!(
            target_status = %target,
            total = result.total,
            succeeded = result.succeeded,
            failed = result.failed,
            "bulk lead transition finished"
        );
        Ok(result)
    }
}
