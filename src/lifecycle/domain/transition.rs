//! Audit records and events produced by committed transitions.

use super::{DecisionReason, LeadId, LeadStatus, TransitionRecordId};
use crate::scope::domain::ActorId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form caller metadata attached to a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransitionMetadata(Map<String, Value>);

impl TransitionMetadata {
    /// Creates empty metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns `true` when no entries are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the metadata as a JSON value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for TransitionMetadata {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Append-only audit record of one committed status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    id: TransitionRecordId,
    lead_id: LeadId,
    previous_status: LeadStatus,
    new_status: LeadStatus,
    actor_id: ActorId,
    reason: DecisionReason,
    occurred_at: DateTime<Utc>,
    metadata: TransitionMetadata,
}

/// Parameter object for building a [`TransitionRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionRecordData {
    /// Record identifier.
    pub id: TransitionRecordId,
    /// Lead that changed.
    pub lead_id: LeadId,
    /// Status before the change.
    pub previous_status: LeadStatus,
    /// Status after the change.
    pub new_status: LeadStatus,
    /// Actor that performed the change.
    pub actor_id: ActorId,
    /// Policy reason the change was permitted.
    pub reason: DecisionReason,
    /// Commit timestamp.
    pub occurred_at: DateTime<Utc>,
    /// Caller metadata.
    pub metadata: TransitionMetadata,
}

impl TransitionRecord {
    /// Builds a record from its parts.
    #[must_use]
    pub fn new(data: TransitionRecordData) -> Self {
        Self {
            id: data.id,
            lead_id: data.lead_id,
            previous_status: data.previous_status,
            new_status: data.new_status,
            actor_id: data.actor_id,
            reason: data.reason,
            occurred_at: data.occurred_at,
            metadata: data.metadata,
        }
    }

    /// Returns the record identifier.
    #[must_use]
    pub const fn id(&self) -> TransitionRecordId {
        self.id
    }

    /// Returns the lead that changed.
    #[must_use]
    pub const fn lead_id(&self) -> LeadId {
        self.lead_id
    }

    /// Returns the status before the change.
    #[must_use]
    pub const fn previous_status(&self) -> LeadStatus {
        self.previous_status
    }

    /// Returns the status after the change.
    #[must_use]
    pub const fn new_status(&self) -> LeadStatus {
        self.new_status
    }

    /// Returns the actor that performed the change.
    #[must_use]
    pub const fn actor_id(&self) -> ActorId {
        self.actor_id
    }

    /// Returns the policy reason the change was permitted.
    #[must_use]
    pub const fn reason(&self) -> DecisionReason {
        self.reason
    }

    /// Returns the commit timestamp.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    /// Returns the caller metadata.
    #[must_use]
    pub const fn metadata(&self) -> &TransitionMetadata {
        &self.metadata
    }

    /// Returns the owner notification describing this change.
    #[must_use]
    pub const fn to_event(&self) -> LeadStatusChanged {
        LeadStatusChanged {
            lead_id: self.lead_id,
            previous_status: self.previous_status,
            new_status: self.new_status,
            actor_id: self.actor_id,
            occurred_at: self.occurred_at,
        }
    }
}

/// Notification sent to a lead's owner after a committed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadStatusChanged {
    /// Lead that changed.
    pub lead_id: LeadId,
    /// Status before the change.
    pub previous_status: LeadStatus,
    /// Status after the change.
    pub new_status: LeadStatus,
    /// Actor that performed the change.
    pub actor_id: ActorId,
    /// Commit timestamp.
    pub occurred_at: DateTime<Utc>,
}
