//! Adapter implementations for scope ports.

pub mod memory;
