//! Authorization scope derived from an actor's memberships.

use super::{MembershipRecord, OrgId, OrgStatus, OrgType, Role, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Entitlement of the scope's organization to perform mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LicenseStatus {
    /// Organization may mutate data.
    Active,
    /// Licensed organization whose expiry has passed.
    LicenseExpired,
    /// Licensed organization with no recorded expiry.
    LicenseMissing,
    /// Organization is suspended.
    Suspended,
    /// Actor has no organization membership at all.
    #[serde(rename = "none")]
    Unaffiliated,
}

impl LicenseStatus {
    /// Classifies the license of a chosen membership record at `now`.
    ///
    /// Suspension wins over every other condition. Self-serve organizations
    /// never expire.
    #[must_use]
    pub fn classify(record: &MembershipRecord, now: DateTime<Utc>) -> Self {
        if record.org_status != OrgStatus::Active {
            return Self::Suspended;
        }
        if record.org_type != OrgType::Licensed {
            return Self::Active;
        }
        match record.license_expires_at {
            None => Self::LicenseMissing,
            Some(expires_at) if expires_at < now => Self::LicenseExpired,
            Some(_) => Self::Active,
        }
    }

    /// Returns `true` when lead mutations are permitted under this status.
    ///
    /// Unaffiliated actors work in a personal scope and may mutate the leads
    /// they own.
    #[must_use]
    pub const fn permits_mutation(self) -> bool {
        matches!(self, Self::Active | Self::Unaffiliated)
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::LicenseExpired => "license_expired",
            Self::LicenseMissing => "license_missing",
            Self::Suspended => "suspended",
            Self::Unaffiliated => "none",
        }
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request authorization and license scope.
///
/// A scope is a pure function of the chosen membership record and the
/// current time and is never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationScope {
    org_id: Option<OrgId>,
    role: Option<Role>,
    team_id: Option<TeamId>,
    license_status: LicenseStatus,
}

impl AuthorizationScope {
    /// Scope for an actor without any organization membership.
    #[must_use]
    pub const fn unaffiliated() -> Self {
        Self {
            org_id: None,
            role: None,
            team_id: None,
            license_status: LicenseStatus::Unaffiliated,
        }
    }

    /// Derives the scope from an actor's memberships.
    ///
    /// The first record whose membership and organization are both active is
    /// chosen; otherwise the first record is used. An empty list yields
    /// [`AuthorizationScope::unaffiliated`].
    #[must_use]
    pub fn derive(records: &[MembershipRecord], now: DateTime<Utc>) -> Self {
        let chosen = records
            .iter()
            .find(|record| record.is_active_candidate())
            .or_else(|| records.first());

        chosen.map_or_else(Self::unaffiliated, |record| Self::from_record(record, now))
    }

    /// Builds a scope from one membership record.
    #[must_use]
    pub fn from_record(record: &MembershipRecord, now: DateTime<Utc>) -> Self {
        Self {
            org_id: Some(record.org_id),
            role: Some(record.role),
            team_id: record.team_id,
            license_status: LicenseStatus::classify(record, now),
        }
    }

    /// Returns the scoped organization, if any.
    #[must_use]
    pub const fn org_id(&self) -> Option<OrgId> {
        self.org_id
    }

    /// Returns the effective role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<Role> {
        self.role
    }

    /// Returns the team assignment, if any.
    #[must_use]
    pub const fn team_id(&self) -> Option<TeamId> {
        self.team_id
    }

    /// Returns the license classification.
    #[must_use]
    pub const fn license_status(&self) -> LicenseStatus {
        self.license_status
    }

    /// Returns `true` when the effective role belongs to the per-organization
    /// administrative set.
    #[must_use]
    pub fn is_org_admin(&self) -> bool {
        self.role.is_some_and(|role| role.capabilities().org_admin)
    }
}
