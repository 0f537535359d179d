//! Per-key async locks.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, Weak};

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Dead entries are purged every this many acquisitions.
const CLEANUP_INTERVAL: usize = 64;

/// Map size below which cleanup is skipped.
const CLEANUP_THRESHOLD: usize = 128;

/// Lock map serializing work on the same key.
///
/// Different keys proceed in parallel. Entries are held as `Weak` references
/// and purged once no guard for them is alive.
pub struct KeyedLocks<K> {
    locks: std::sync::Mutex<HashMap<K, Weak<Mutex<()>>>>,
    acquire_counter: AtomicUsize,
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: std::sync::Mutex::new(HashMap::new()),
            acquire_counter: AtomicUsize::new(0),
        }
    }

    /// Wait for exclusive access to `key`.
    pub async fn acquire(&self, key: &K) -> KeyedGuard {
        let mutex = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

            let mutex = map.get(key).and_then(Weak::upgrade).unwrap_or_else(|| {
                let new_mutex = Arc::new(Mutex::new(()));
                map.insert(key.clone(), Arc::downgrade(&new_mutex));
                new_mutex
            });

            let tick = self.acquire_counter.fetch_add(1, Ordering::Relaxed);
            if map.len() > CLEANUP_THRESHOLD && tick.is_multiple_of(CLEANUP_INTERVAL) {
                map.retain(|_, weak| weak.strong_count() > 0);
            }

            mutex
        };

        KeyedGuard {
            _guard: mutex.lock_owned().await,
        }
    }

    /// Number of entries in the map, live or not.
    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K: Eq + Hash + Clone> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds a key's lock until dropped.
pub struct KeyedGuard {
    _guard: OwnedMutexGuard<()>,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = KeyedLocks::new();
        let guard = locks.acquire(&1).await;

        let second = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&1)).await;
        assert!(second.is_err(), "second acquire should wait");

        drop(guard);
        let third = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&1)).await;
        assert!(third.is_ok());
    }

    #[tokio::test]
    async fn test_different_keys_do_not_block() {
        let locks = KeyedLocks::new();
        let _a = locks.acquire(&1).await;

        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&2)).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_dead_entries_are_purged() {
        let locks = KeyedLocks::new();
        for key in 0..(CLEANUP_THRESHOLD * 2) {
            drop(locks.acquire(&key).await);
        }

        assert!(locks.entry_count() < CLEANUP_THRESHOLD * 2);
    }
}
