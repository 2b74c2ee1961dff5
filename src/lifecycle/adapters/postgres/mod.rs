//! `PostgreSQL` adapters for lead lifecycle persistence.

mod audit;
mod models;
mod repository;
mod schema;

pub use audit::PostgresAuditSink;
pub use repository::{LeadPgPool, PostgresLeadRepository};
