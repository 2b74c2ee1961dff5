//! Error types for parsing scope domain values from the membership store.

use thiserror::Error;

/// Error returned while parsing a role name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing membership enumerations from storage.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseMembershipError {
    /// The organization type is not recognised.
    #[error("unknown organization type: {0}")]
    OrgType(String),

    /// The organization status is not recognised.
    #[error("unknown organization status: {0}")]
    OrgStatus(String),

    /// The membership status is not recognised.
    #[error("unknown membership status: {0}")]
    MembershipStatus(String),
}
