//! Resolution of an actor's authorization scope.

use crate::scope::{
    domain::{ActorId, AuthorizationScope},
    ports::{MembershipSource, MembershipSourceError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Errors surfaced while resolving a scope.
#[derive(Debug, Error)]
pub enum ScopeResolutionError {
    /// The membership source failed.
    #[error(transparent)]
    Membership(#[from] MembershipSourceError),
}

/// Result type for scope resolution.
pub type ScopeResolutionResult<T> = Result<T, ScopeResolutionError>;

/// Derives per-request authorization scopes from the membership source.
#[derive(Clone)]
pub struct OrgScopeResolver<M, C>
where
    M: MembershipSource,
    C: Clock + Send + Sync,
{
    memberships: Arc<M>,
    clock: Arc<C>,
}

impl<M, C> OrgScopeResolver<M, C>
where
    M: MembershipSource,
    C: Clock + Send + Sync,
{
    /// Creates a new resolver.
    #[must_use]
    pub const fn new(memberships: Arc<M>, clock: Arc<C>) -> Self {
        Self { memberships, clock }
    }

    /// Resolves the scope the actor operates in right now.
    ///
    /// An environment where the membership capability is not provisioned
    /// resolves to the unaffiliated scope.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeResolutionError::Membership`] for any membership source
    /// failure other than [`MembershipSourceError::NotProvisioned`].
    pub async fn resolve(&self, actor_id: ActorId) -> ScopeResolutionResult<AuthorizationScope> {
        let records = match self.memberships.memberships_for(actor_id).await {
            Ok(records) => records,
            Err(MembershipSourceError::NotProvisioned) => {
                tracing::warn!(
                    actor_id = %actor_id,
                    "membership source not provisioned; resolving unaffiliated scope"
                );
                return Ok(AuthorizationScope::unaffiliated());
            }
            Err(err) => return Err(err.into()),
        };

        let scope = AuthorizationScope::derive(&records, self.clock.utc());
        tracing::debug!(
            actor_id = %actor_id,
            memberships = records.len(),
            license_status = %scope.license_status(),
            "resolved authorization scope"
        );
        Ok(scope)
    }
}
