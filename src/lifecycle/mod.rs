//! Lead lifecycle transition engine.
//!
//! Guards the ordered pipeline status of leads. A single transition is
//! validated against the forward-only policy, written with a
//! compare-and-swap on the previously read status, recorded in an
//! append-only audit trail, and announced to the lead owner on a best-effort
//! basis. Retried requests are deduplicated by idempotency key, and bulk
//! requests degrade per item instead of failing as a whole. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Engine configuration in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
