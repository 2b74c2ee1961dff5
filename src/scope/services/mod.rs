//! Application services for authorization scope resolution.

mod resolver;

pub use resolver::{OrgScopeResolver, ScopeResolutionError, ScopeResolutionResult};
