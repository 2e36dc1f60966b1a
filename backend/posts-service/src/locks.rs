//! Per-key reader/writer locks
//!
//! Each distinct key (a post id for comment threads) gets its own async lock,
//! created on first use. Unrelated keys never contend. The registry mutex is
//! only held to look up or insert an entry, never while a guard is alive.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{OwnedRwLockReadGuard, OwnedRwLockWriteGuard, RwLock};

/// Exclusive access to one key, released on drop
pub type ExclusiveGuard = OwnedRwLockWriteGuard<()>;
/// Shared access to one key, released on drop
pub type SharedGuard = OwnedRwLockReadGuard<()>;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, key: &str) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(key) {
            return lock.clone();
        }
        locks.entry(key.to_string()).or_default().clone()
    }

    /// Wait for exclusive access to `key`
    pub async fn acquire(&self, key: &str) -> ExclusiveGuard {
        self.lock_for(key).write_owned().await
    }

    /// Wait for shared access to `key`
    pub async fn acquire_shared(&self, key: &str) -> SharedGuard {
        self.lock_for(key).read_owned().await
    }

    /// Drop entries nobody holds or waits on. Returns how many were removed.
    ///
    /// Guards and pending acquisitions own a clone of the entry, so an entry
    /// referenced only by the registry is idle.
    pub fn prune_idle(&self) -> usize {
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - locks.len()
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    async fn peak_concurrency(locks: Arc<KeyedLocks>, keys: Vec<&'static str>, rounds: usize) -> usize {
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..rounds {
            for key in keys.iter().copied() {
                let locks = locks.clone();
                let current = current.clone();
                let peak = peak.clone();
                handles.push(tokio::spawn(async move {
                    let _guard = locks.acquire(key).await;
                    let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    current.fetch_sub(1, Ordering::SeqCst);
                }));
            }
        }

        for handle in handles {
            handle.await.unwrap();
        }
        peak.load(Ordering::SeqCst)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedLocks::new());
        assert_eq!(peak_concurrency(locks.clone(), vec!["post-1"], 8).await, 1);
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_distinct_keys_do_not_contend() {
        let locks = Arc::new(KeyedLocks::new());
        let peak = peak_concurrency(locks.clone(), vec!["a", "b", "c"], 4).await;
        assert!(peak > 1, "peak concurrency was {}", peak);
        assert_eq!(locks.len(), 3);
    }

    #[tokio::test]
    async fn test_shared_guards_coexist_and_block_writers() {
        let locks = KeyedLocks::new();
        let first = locks.acquire_shared("post").await;
        let second = locks.acquire_shared("post").await;

        let blocked = tokio::time::timeout(Duration::from_millis(20), locks.acquire("post")).await;
        assert!(blocked.is_err());

        drop(first);
        drop(second);
        let _exclusive = locks.acquire("post").await;
    }

    #[tokio::test]
    async fn test_guard_released_when_holder_panics() {
        let locks = Arc::new(KeyedLocks::new());

        let holder = locks.clone();
        let result = tokio::spawn(async move {
            let _guard = holder.acquire("post").await;
            panic!("critical section failed");
        })
        .await;
        assert!(result.is_err());

        let reacquired = tokio::time::timeout(Duration::from_secs(1), locks.acquire("post")).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn test_prune_idle_keeps_held_entries() {
        let locks = KeyedLocks::new();
        let held = locks.acquire("held").await;
        drop(locks.acquire("idle").await);
        assert_eq!(locks.len(), 2);

        assert_eq!(locks.prune_idle(), 1);
        assert_eq!(locks.len(), 1);

        drop(held);
        assert_eq!(locks.prune_idle(), 1);
        assert!(locks.is_empty());
    }
}
