//! Leadline: lead lifecycle transition engine for a multi-tenant CRM.
//!
//! This crate guards the pipeline status of sales leads. It resolves the
//! organization, role, and license an actor operates under, enforces a
//! forward-only status ordering with controlled overrides, and commits
//! transitions with compare-and-swap writes, audit records, and owner
//! notifications, singly or in bulk.
//!
//! # Architecture
//!
//! Leadline follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for external interactions
//! - **Adapters**: Concrete implementations of ports (database, in-memory)
//!
//! # Modules
//!
//! - [`scope`]: Authorization and license scope resolution
//! - [`lifecycle`]: Transition policy, idempotency, and transition services

#[cfg(test)]
mod clock;
pub mod lifecycle;
pub mod scope;
