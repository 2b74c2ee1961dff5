//! Membership records as supplied by the external membership store.

use super::{ActorId, OrgId, ParseMembershipError, Role, TeamId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Organization billing tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgType {
    /// Paid tier whose entitlement is bounded by a license expiry.
    Licensed,
    /// Self-serve tier; never expires.
    SelfServe,
}

impl OrgType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Licensed => "licensed",
            Self::SelfServe => "self_serve",
        }
    }
}

impl TryFrom<&str> for OrgType {
    type Error = ParseMembershipError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "licensed" => Ok(Self::Licensed),
            "self_serve" => Ok(Self::SelfServe),
            _ => Err(ParseMembershipError::OrgType(value.to_owned())),
        }
    }
}

/// Organization account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrgStatus {
    /// Organization is in good standing.
    Active,
    /// Organization has been suspended.
    Suspended,
}

impl OrgStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }
}

impl TryFrom<&str> for OrgStatus {
    type Error = ParseMembershipError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "suspended" => Ok(Self::Suspended),
            _ => Err(ParseMembershipError::OrgStatus(value.to_owned())),
        }
    }
}

/// Status of the actor's membership in an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// Membership is accepted and usable.
    Active,
    /// Invitation sent but not yet accepted.
    Invited,
    /// Membership has been disabled by an administrator.
    Disabled,
}

impl MembershipStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Invited => "invited",
            Self::Disabled => "disabled",
        }
    }
}

impl TryFrom<&str> for MembershipStatus {
    type Error = ParseMembershipError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "invited" => Ok(Self::Invited),
            "disabled" => Ok(Self::Disabled),
            _ => Err(ParseMembershipError::MembershipStatus(value.to_owned())),
        }
    }
}

/// One organization membership held by an actor.
///
/// Records are a read-only snapshot owned by the membership store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipRecord {
    /// Member actor.
    pub actor_id: ActorId,
    /// Organization the membership belongs to.
    pub org_id: OrgId,
    /// Organization billing tier.
    pub org_type: OrgType,
    /// Organization account status.
    pub org_status: OrgStatus,
    /// License expiry for licensed organizations.
    pub license_expires_at: Option<DateTime<Utc>>,
    /// Role the actor holds in the organization.
    pub role: Role,
    /// Membership status.
    pub status: MembershipStatus,
    /// Team the actor is assigned to, if any.
    pub team_id: Option<TeamId>,
}

impl MembershipRecord {
    /// Creates an active membership in an active self-serve organization.
    #[must_use]
    pub const fn new(actor_id: ActorId, org_id: OrgId, role: Role) -> Self {
        Self {
            actor_id,
            org_id,
            org_type: OrgType::SelfServe,
            org_status: OrgStatus::Active,
            license_expires_at: None,
            role,
            status: MembershipStatus::Active,
            team_id: None,
        }
    }

    /// Marks the organization as licensed with the given expiry.
    #[must_use]
    pub const fn licensed(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.org_type = OrgType::Licensed;
        self.license_expires_at = expires_at;
        self
    }

    /// Sets the organization status.
    #[must_use]
    pub const fn with_org_status(mut self, org_status: OrgStatus) -> Self {
        self.org_status = org_status;
        self
    }

    /// Sets the membership status.
    #[must_use]
    pub const fn with_status(mut self, status: MembershipStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the team assignment.
    #[must_use]
    pub const fn with_team(mut self, team_id: TeamId) -> Self {
        self.team_id = Some(team_id);
        self
    }

    /// Returns `true` when both the membership and its organization are
    /// active.
    #[must_use]
    pub fn is_active_candidate(&self) -> bool {
        self.status == MembershipStatus::Active && self.org_status == OrgStatus::Active
    }
}
