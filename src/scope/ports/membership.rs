//! Membership source port.

use crate::scope::domain::{ActorId, MembershipRecord};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for membership source operations.
pub type MembershipSourceResult<T> = Result<T, MembershipSourceError>;

/// Read-only access to the memberships an actor holds.
#[async_trait]
pub trait MembershipSource: Send + Sync {
    /// Returns every membership held by the actor, in store order.
    ///
    /// # Errors
    ///
    /// Returns [`MembershipSourceError::NotProvisioned`] when the membership
    /// capability does not exist yet in the current environment, or
    /// [`MembershipSourceError::Unavailable`] for any other failure.
    async fn memberships_for(&self, actor_id: ActorId)
    -> MembershipSourceResult<Vec<MembershipRecord>>;
}

/// Errors returned by membership source implementations.
#[derive(Debug, Clone, Error)]
pub enum MembershipSourceError {
    /// The membership capability is not provisioned in this environment.
    #[error("membership source is not provisioned")]
    NotProvisioned,

    /// The source failed for another reason.
    #[error("membership source unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl MembershipSourceError {
    /// Wraps an underlying source failure.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}
