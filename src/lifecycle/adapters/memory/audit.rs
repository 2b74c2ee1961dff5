//! In-memory append-only audit log.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::{LeadId, TransitionRecord},
    ports::{AuditSink, AuditSinkError, AuditSinkResult},
};

/// Thread-safe in-memory audit log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditLog {
    records: Arc<RwLock<Vec<TransitionRecord>>>,
}

impl InMemoryAuditLog {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every record across all leads in append order.
    ///
    /// # Errors
    ///
    /// Returns [`AuditSinkError::Persistence`] when the lock is poisoned.
    pub fn all(&self) -> AuditSinkResult<Vec<TransitionRecord>> {
        let records = self.records.read().map_err(|err| {
            AuditSinkError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(records.clone())
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditLog {
    async fn append(&self, record: &TransitionRecord) -> AuditSinkResult<()> {
        let mut records = self.records.write().map_err(|err| {
            AuditSinkError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if records.iter().any(|existing| existing.id() == record.id()) {
            return Err(AuditSinkError::DuplicateRecord(record.id()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn history(&self, lead_id: LeadId) -> AuditSinkResult<Vec<TransitionRecord>> {
        let records = self.records.read().map_err(|err| {
            AuditSinkError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(records
            .iter()
            .filter(|record| record.lead_id() == lead_id)
            .cloned()
            .collect())
    }
}
