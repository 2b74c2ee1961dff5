//! Unit tests for the scope module.
