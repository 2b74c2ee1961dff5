//! Adapter implementations for lead lifecycle ports.

pub mod memory;
pub mod postgres;
