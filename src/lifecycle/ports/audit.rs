//! Append-only audit sink port.

use crate::lifecycle::domain::{LeadId, TransitionRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit sink operations.
pub type AuditSinkResult<T> = Result<T, AuditSinkError>;

/// Append-only store of transition records.
///
/// Records are never updated or deleted once appended.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError`] when the record cannot be written.
    async fn append(&self, record: &TransitionRecord) -> AuditSinkResult<()>;

    /// Returns every record for a lead in append order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError`] when the records cannot be read.
    async fn history(&self, lead_id: LeadId) -> AuditSinkResult<Vec<TransitionRecord>>;
}

/// Errors returned by audit sink implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditSinkError {
    /// A record with the same identifier was already appended.
    #[error("duplicate transition record: {0}")]
    DuplicateRecord(crate::lifecycle::domain::TransitionRecordId),

    /// Persistence-layer failure.
    #[error("audit persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditSinkError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
