//! In-memory adapters for lead lifecycle tests.

mod audit;
mod lead;
mod notification;

pub use audit::InMemoryAuditLog;
pub use lead::InMemoryLeadRepository;
pub use notification::RecordingNotificationChannel;
