//! Per-key deduplication of mutating calls.

use crate::lifecycle::config::IdempotencyConfig;
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::OnceCell;

/// Cached result of one executed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotencyEntry<K, T> {
    key: K,
    result: T,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl<K, T> IdempotencyEntry<K, T> {
    /// Returns the key the entry was stored under.
    #[must_use]
    pub const fn key(&self) -> &K {
        &self.key
    }

    /// Returns the cached result.
    #[must_use]
    pub const fn result(&self) -> &T {
        &self.result
    }

    /// Returns when the result was cached.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the entry stops being replayable.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns `true` once `now` has reached the expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

type Slot<K, T> = Arc<OnceCell<IdempotencyEntry<K, T>>>;

/// Runs a mutation at most once per distinct key within the retention
/// window.
///
/// The key type decides what counts as the same call; callers fold in
/// whatever must match for a replay to be legitimate.
///
/// Concurrent callers sharing an unseen key are serialized on the key's
/// slot: one runs the thunk, the rest wait and observe its result. A failed
/// thunk leaves the slot empty so the next caller runs again. The gate is
/// in-process only; cross-instance safety comes from the store's
/// compare-and-swap write.
pub struct IdempotencyGuard<K, T, C>
where
    C: Clock + Send + Sync,
{
    slots: Mutex<HashMap<K, Slot<K, T>>>,
    config: IdempotencyConfig,
    clock: Arc<C>,
}

impl<K, T, C> IdempotencyGuard<K, T, C>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync,
    T: Clone + Send + Sync,
    C: Clock + Send + Sync,
{
    /// Creates an empty guard.
    #[must_use]
    pub fn new(config: IdempotencyConfig, clock: Arc<C>) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            config,
            clock,
        }
    }

    /// Returns the live cached result for `key`, if any.
    #[must_use]
    pub fn cached(&self, key: &K) -> Option<T> {
        let now = self.clock.utc();
        let slots = self.lock_slots();
        slots
            .get(key)
            .and_then(|slot| slot.get())
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.result.clone())
    }

    /// Runs `thunk` under `key`.
    ///
    /// Without a key the thunk runs exactly once and nothing is cached. With
    /// a key that has a live entry the cached result is returned and the
    /// thunk is dropped unrun.
    ///
    /// # Errors
    ///
    /// Returns the thunk's error unchanged; errors are never cached.
    pub async fn run<F, Fut, E>(&self, key: Option<&K>, thunk: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(idempotency_key) = key else {
            return thunk().await;
        };

        let slot = self.slot_for(idempotency_key);
        if slot.initialized() {
            tracing::debug!(key = ?idempotency_key, "replaying cached idempotent result");
        }

        let entry = slot
            .get_or_try_init(|| async move {
                let result = thunk().await?;
                let created_at = self.clock.utc();
                Ok::<_, E>(IdempotencyEntry {
                    key: idempotency_key.clone(),
                    result,
                    created_at,
                    expires_at: created_at + self.config.ttl,
                })
            })
            .await?;
        Ok(entry.result.clone())
    }

    /// Removes expired entries and abandoned empty slots, returning how many
    /// were removed.
    pub fn evict_expired(&self) -> usize {
        let now = self.clock.utc();
        let mut slots = self.lock_slots();
        purge_expired(&mut slots, now)
    }

    /// Returns the number of retained slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    /// Returns `true` when no slots are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn slot_for(&self, key: &K) -> Slot<K, T> {
        let now = self.clock.utc();
        let mut slots = self.lock_slots();

        if let Some(existing) = slots.get(key) {
            let expired = existing.get().is_some_and(|entry| entry.is_expired(now));
            if !expired {
                return Arc::clone(existing);
            }
        }

        if !slots.contains_key(key) && slots.len() >= self.config.max_entries {
            let purged = purge_expired(&mut slots, now);
            let evicted = evict_soonest_expiring(&mut slots, self.config.max_entries);
            tracing::debug!(purged, evicted, "idempotency store at capacity");
        }

        let slot: Slot<K, T> = Arc::new(OnceCell::new());
        slots.insert(key.clone(), Arc::clone(&slot));
        slot
    }

    fn lock_slots(&self) -> MutexGuard<'_, HashMap<K, Slot<K, T>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn purge_expired<K, T>(slots: &mut HashMap<K, Slot<K, T>>, now: DateTime<Utc>) -> usize {
    let before = slots.len();
    slots.retain(|_, slot| match slot.get() {
        Some(entry) => !entry.is_expired(now),
        // An empty slot nobody else references belongs to a failed call.
        None => Arc::strong_count(slot) > 1,
    });
    before.saturating_sub(slots.len())
}

fn evict_soonest_expiring<K: Eq + Hash + Clone, T>(
    slots: &mut HashMap<K, Slot<K, T>>,
    max_entries: usize,
) -> usize {
    let excess = (slots.len() + 1).saturating_sub(max_entries);
    if excess == 0 {
        return 0;
    }

    let mut completed: Vec<(DateTime<Utc>, K)> = slots
        .iter()
        .filter_map(|(key, slot)| slot.get().map(|entry| (entry.expires_at, key.clone())))
        .collect();
    completed.sort_by_key(|(expires_at, _)| *expires_at);

    let mut evicted = 0;
    for (_, key) in completed.into_iter().take(excess) {
        slots.remove(&key);
        evicted += 1;
    }
    evicted
}
