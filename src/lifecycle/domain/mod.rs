//! Domain model for the lead lifecycle.
//!
//! Covers the ordered pipeline status, the lead aggregate with its
//! concurrency version, the forward-only transition policy, and the audit
//! records committed transitions leave behind.

mod error;
mod ids;
mod lead;
mod policy;
mod status;
mod transition;

pub use error::{LifecycleDomainError, ParseEnforcementModeError, ParseLeadStatusError};
pub use ids::{IdempotencyKey, LeadId, TransitionRecordId};
pub use lead::{Lead, PersistedLeadData};
pub use policy::{
    DecisionReason, EnforcementMode, PolicyDecision, TransitionPolicy, TransitionViolation,
};
pub use status::LeadStatus;
pub use transition::{LeadStatusChanged, TransitionMetadata, TransitionRecord, TransitionRecordData};
