//! Error types for lifecycle domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing lifecycle domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LifecycleDomainError {
    /// The idempotency key is empty after trimming.
    #[error("idempotency key must not be empty")]
    EmptyIdempotencyKey,

    /// The idempotency key exceeds the storage limit.
    #[error("idempotency key exceeds {max} characters")]
    IdempotencyKeyTooLong {
        /// Maximum accepted length.
        max: usize,
    },
}

/// Error returned while parsing lead statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown lead status: {0}")]
pub struct ParseLeadStatusError(pub String);

/// Error returned while parsing an enforcement mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown enforcement mode '{0}', expected off, log_only or enforce")]
pub struct ParseEnforcementModeError(pub String);
