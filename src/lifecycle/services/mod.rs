//! Application services for lead lifecycle orchestration.

mod bulk;
mod idempotency;
mod transition;

pub use bulk::{
    BulkItemOutcome, BulkItemStatus, BulkResult, BulkTransitionCoordinator, BulkTransitionError,
    BulkTransitionRequest, BulkTransitionResult,
};
pub use idempotency::{IdempotencyEntry, IdempotencyGuard};
pub use transition::{
    ActorContext, LifecycleTransitionService, ReplayKey, TransitionError, TransitionErrorKind,
    TransitionOutcome, TransitionRequest, TransitionResult,
};
