//! Domain model for multi-tenant authorization scope.
//!
//! Membership records arrive from an external store; the scope derived from
//! them decides which organization an actor acts in, with which role, and
//! whether that organization's license permits mutations.

mod error;
mod ids;
mod membership;
mod role;
mod scope;

pub use error::{ParseMembershipError, ParseRoleError};
pub use ids::{ActorId, OrgId, TeamId};
pub use membership::{MembershipRecord, MembershipStatus, OrgStatus, OrgType};
pub use role::{Role, RoleCapabilities};
pub use scope::{AuthorizationScope, LicenseStatus};
