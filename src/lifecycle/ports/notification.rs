//! Best-effort owner notification port.

use crate::lifecycle::domain::LeadStatusChanged;
use crate::scope::domain::ActorId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Delivery channel for lead owner notifications.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Sends `event` to `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when delivery fails. Callers treat the
    /// failure as non-fatal.
    async fn send(&self, owner_id: ActorId, event: &LeadStatusChanged)
    -> Result<(), NotificationError>;
}

/// Error returned when a notification cannot be delivered.
#[derive(Debug, Clone, Error)]
#[error("notification delivery failed: {0}")]
pub struct NotificationError(pub Arc<dyn std::error::Error + Send + Sync>);

impl NotificationError {
    /// Wraps a delivery error.
    pub fn delivery(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
