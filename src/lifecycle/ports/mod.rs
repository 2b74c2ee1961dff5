//! Port contracts for the lead lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by lifecycle
//! services: the lead store with its compare-and-swap write, the audit sink,
//! and the owner notification channel.

pub mod audit;
pub mod notification;
pub mod repository;

pub use audit::{AuditSink, AuditSinkError, AuditSinkResult};
pub use notification::{NotificationChannel, NotificationError};
pub use repository::{LeadRepository, LeadRepositoryError, LeadRepositoryResult, StatusUpdate};
