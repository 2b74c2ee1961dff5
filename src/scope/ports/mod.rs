//! Port contracts for authorization scope resolution.

pub mod membership;

pub use membership::{MembershipSource, MembershipSourceError, MembershipSourceResult};
