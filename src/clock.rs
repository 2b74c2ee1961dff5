//! Manually advanced clock for tests.
//!
//! [`ManualClock`] implements [`mockable::Clock`] with an instant that only
//! moves when told to, which keeps license expiry and idempotency retention
//! deterministic. Shared by the unit tests and the in-memory integration
//! tests.

use chrono::{DateTime, Duration, Local, Utc};
use mockable::Clock;
use std::sync::{Arc, RwLock};

/// Clock whose current instant is set explicitly.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<RwLock<DateTime<Utc>>>,
}

impl ManualClock {
    /// Creates a clock pinned to `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        let mut now = self
            .now
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self
            .now
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
