//! Notification channel that records deliveries instead of sending them.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::lifecycle::{
    domain::LeadStatusChanged,
    ports::{NotificationChannel, NotificationError},
};
use crate::scope::domain::ActorId;

/// Thread-safe recording notification channel.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationChannel {
    sent: Arc<RwLock<Vec<(ActorId, LeadStatusChanged)>>>,
}

impl RecordingNotificationChannel {
    /// Creates an empty channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every delivered `(owner, event)` pair in delivery order.
    #[must_use]
    pub fn sent(&self) -> Vec<(ActorId, LeadStatusChanged)> {
        self.sent
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl NotificationChannel for RecordingNotificationChannel {
    async fn send(
        &self,
        owner_id: ActorId,
        event: &LeadStatusChanged,
    ) -> Result<(), NotificationError> {
        let mut sent = self
            .sent
            .write()
            .map_err(|err| NotificationError::delivery(std::io::Error::other(err.to_string())))?;
        sent.push((owner_id, *event));
        Ok(())
    }
}
