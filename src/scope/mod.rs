//! Multi-tenant authorization scope resolution.
//!
//! Turns the raw organization memberships of an actor into a single
//! [`domain::AuthorizationScope`]: which organization the actor acts in, the
//! effective role, the team, and whether the organization's license allows
//! lead mutations. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
