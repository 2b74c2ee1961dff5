//! In-memory repository for lead lifecycle tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::{Lead, LeadId, LeadStatus},
    ports::{LeadRepository, LeadRepositoryError, LeadRepositoryResult, StatusUpdate},
};

/// Thread-safe in-memory lead repository.
///
/// The compare-and-swap update holds the write lock across the check and
/// the write, so racing updates serialize exactly as a conditional `UPDATE`
/// would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLeadRepository {
    state: Arc<RwLock<HashMap<LeadId, Lead>>>,
}

impl InMemoryLeadRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of successful status writes recorded so far.
    ///
    /// # Errors
    ///
    /// Returns [`LeadRepositoryError::Persistence`] when the lock is poisoned.
    pub fn total_versions(&self) -> LeadRepositoryResult<u64> {
        let state = self.state.read().map_err(|err| {
            LeadRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.values().map(Lead::version).sum())
    }
}

#[async_trait]
impl LeadRepository for InMemoryLeadRepository {
    async fn store(&self, lead: &Lead) -> LeadRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            LeadRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        if state.contains_key(&lead.id()) {
            return Err(LeadRepositoryError::DuplicateLead(lead.id()));
        }
        state.insert(lead.id(), lead.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: LeadId) -> LeadRepositoryResult<Option<Lead>> {
        let state = self.state.read().map_err(|err| {
            LeadRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.get(&id).cloned())
    }

    async fn compare_and_set_status(
        &self,
        id: LeadId,
        expected: LeadStatus,
        target: LeadStatus,
        updated_at: DateTime<Utc>,
    ) -> LeadRepositoryResult<StatusUpdate> {
        let mut state = self.state.write().map_err(|err| {
            LeadRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })?;
        let lead = state.get_mut(&id).ok_or(LeadRepositoryError::NotFound(id))?;
        if lead.status() != expected {
            return Ok(StatusUpdate::Conflict {
                actual: lead.status(),
            });
        }
        lead.apply_status(target, updated_at);
        Ok(StatusUpdate::Applied(lead.clone()))
    }
}
