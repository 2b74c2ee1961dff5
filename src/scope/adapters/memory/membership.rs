//! In-memory membership source.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::scope::{
    domain::{ActorId, MembershipRecord},
    ports::{MembershipSource, MembershipSourceError, MembershipSourceResult},
};

/// Thread-safe in-memory membership source.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMembershipSource {
    state: Arc<RwLock<InMemoryMembershipState>>,
}

#[derive(Debug, Default)]
struct InMemoryMembershipState {
    memberships: HashMap<ActorId, Vec<MembershipRecord>>,
    unprovisioned: bool,
}

impl InMemoryMembershipSource {
    /// Creates an empty, provisioned membership source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source that reports the capability as not provisioned.
    #[must_use]
    pub fn unprovisioned() -> Self {
        let source = Self::default();
        source.write_state().unprovisioned = true;
        source
    }

    /// Appends a membership record for its actor.
    pub fn insert(&self, record: MembershipRecord) {
        self.write_state()
            .memberships
            .entry(record.actor_id)
            .or_default()
            .push(record);
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, InMemoryMembershipState> {
        self.state
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl MembershipSource for InMemoryMembershipSource {
    async fn memberships_for(
        &self,
        actor_id: ActorId,
    ) -> MembershipSourceResult<Vec<MembershipRecord>> {
        let state = self.state.read().map_err(|err| {
            MembershipSourceError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        if state.unprovisioned {
            return Err(MembershipSourceError::NotProvisioned);
        }
        Ok(state.memberships.get(&actor_id).cloned().unwrap_or_default())
    }
}
