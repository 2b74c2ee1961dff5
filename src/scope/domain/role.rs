//! Closed role set and the capability table derived from it.

use super::ParseRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Role an actor holds inside an organization.
///
/// Adding a variant forces a decision in [`Role::capabilities`], so no role
/// can gain or lose lifecycle override capability by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Organization owner.
    Owner,
    /// Organization administrator.
    Admin,
    /// Sales manager supervising a team.
    Manager,
    /// Individual contributor working leads.
    SalesRep,
    /// Read-only member.
    Viewer,
}

/// Capabilities granted by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleCapabilities {
    /// May set any lead status regardless of pipeline ordering.
    pub lifecycle_override: bool,
    /// Belongs to the per-organization administrative set.
    pub org_admin: bool,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Owner,
        Self::Admin,
        Self::Manager,
        Self::SalesRep,
        Self::Viewer,
    ];

    /// Returns the capability table entry for this role.
    #[must_use]
    pub const fn capabilities(self) -> RoleCapabilities {
        match self {
            Self::Owner | Self::Admin => RoleCapabilities {
                lifecycle_override: true,
                org_admin: true,
            },
            Self::Manager => RoleCapabilities {
                lifecycle_override: true,
                org_admin: false,
            },
            Self::SalesRep | Self::Viewer => RoleCapabilities {
                lifecycle_override: false,
                org_admin: false,
            },
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::SalesRep => "sales_rep",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "manager" => Ok(Self::Manager),
            "sales_rep" => Ok(Self::SalesRep),
            "viewer" => Ok(Self::Viewer),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}
