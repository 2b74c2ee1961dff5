//! Shared environment helpers for integration tests.

use std::env;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static ENV_MUTEX: OnceLock<Mutex<()>> = OnceLock::new();

/// Scoped environment update, restored on drop.
///
/// Holding the guard serializes every test that touches the process
/// environment.
pub struct EnvVarGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: MutexGuard<'static, ()>,
}

impl EnvVarGuard {
    /// Sets (`Some`) or clears (`None`) each variable for the guard lifetime.
    pub fn set_many(changes: &[(&'static str, Option<&str>)]) -> Self {
        let lock = env_lock();
        let previous = changes
            .iter()
            .map(|(key, value)| {
                let saved = (*key, env::var(key).ok());
                unsafe {
                    // SAFETY: the global mutex serializes environment mutations in tests.
                    match value {
                        Some(new_value) => env::set_var(key, new_value),
                        None => env::remove_var(key),
                    }
                }
                saved
            })
            .collect();

        Self {
            previous,
            _lock: lock,
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            unsafe {
                // SAFETY: the global mutex serializes environment mutations in tests.
                match value {
                    Some(previous) => env::set_var(key, previous),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}
