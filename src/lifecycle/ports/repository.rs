//! Repository port for lead persistence and guarded status updates.

use crate::lifecycle::domain::{Lead, LeadId, LeadStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for lead repository operations.
pub type LeadRepositoryResult<T> = Result<T, LeadRepositoryError>;

/// Outcome of a compare-and-swap status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The stored status matched and the update was applied.
    Applied(Lead),
    /// The stored status no longer matched; nothing was written.
    Conflict {
        /// Status found in storage.
        actual: LeadStatus,
    },
}

/// Lead persistence contract.
#[async_trait]
pub trait LeadRepository: Send + Sync {
    /// Stores a new lead.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::DuplicateLead`] when the lead ID already
    /// exists.
    async fn store(&self, lead: &Lead) -> LeadRepositoryResult<()>;

    /// Finds a lead by identifier.
    ///
    /// Returns `None` when the lead does not exist.
    async fn find_by_id(&self, id: LeadId) -> LeadRepositoryResult<Option<Lead>>;

    /// Sets the lead status to `target` only if the stored status still
    /// equals `expected`, bumping the version and update timestamp.
    ///
    /// The check and the write must be atomic with respect to every other
    /// writer, including other processes sharing the same storage.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::NotFound`] when the lead does not exist.
    async fn compare_and_set_status(
        &self,
        id: LeadId,
        expected: LeadStatus,
        target: LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> LeadRepositoryResult<StatusUpdate>;
}

/// Errors returned by lead repository implementations.
#[derive(Debug, Clone, Error)]
pub enum LeadRepositoryError {
    /// A lead with the same identifier already exists.
    #[error("duplicate lead identifier: {0}")]
    DuplicateLead(LeadId),

    /// The lead was not found.
    #[error("lead not found: {0}")]
    NotFound(LeadId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl LeadRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
