//! In-memory adapters for scope resolution tests.

mod membership;

pub use membership::InMemoryMembershipSource;
