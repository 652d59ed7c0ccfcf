//! Per-identifier mutual exclusion.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tokio::sync::{Mutex, MutexGuard};

/// Number of lock shards used by default.
pub const DEFAULT_LOCK_SHARDS: usize = 64;

/// A fixed set of async mutexes selected by key hash.
///
/// Two operations on the same key always contend on the same shard. Unrelated
/// keys may share a shard, which only costs some throughput.
#[derive(Debug)]
pub struct KeyedLocks {
    shards: Box<[Mutex<()>]>,
}

impl KeyedLocks {
    /// Creates a lock set with the given number of shards (at least one).
    #[must_use]
    pub fn new(shards: usize) -> Self {
        let count = shards.max(1);
        Self {
            shards: (0..count).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Number of shards.
    #[must_use]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard guarding `key`.
    #[must_use]
    pub fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Waits for and acquires the lock guarding `key`.
    pub async fn lock(&self, key: &str) -> MutexGuard<'_, ()> {
        self.shards[self.shard_index(key)].lock().await
    }
}

impl Default for KeyedLocks {
    fn default() -> Self {
        Self::new(DEFAULT_LOCK_SHARDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_zero_shards_clamped_to_one() {
        let locks = KeyedLocks::new(0);
        assert_eq!(locks.shard_count(), 1);
        assert_eq!(locks.shard_index("anything"), 0);
    }

    #[test]
    fn test_shard_index_is_stable() {
        let locks = KeyedLocks::default();
        let first = locks.shard_index("trade-1");
        assert_eq!(first, locks.shard_index("trade-1"));
        assert!(first < DEFAULT_LOCK_SHARDS);
    }

    #[tokio::test]
    async fn test_same_key_is_exclusive() {
        let locks = Arc::new(KeyedLocks::default());
        let guard = locks.lock("trade-1").await;

        let contender = Arc::clone(&locks);
        let blocked = tokio::time::timeout(Duration::from_millis(50), async move {
            let _g = contender.lock("trade-1").await;
        })
        .await;
        assert!(blocked.is_err());

        drop(guard);
        let acquired = tokio::time::timeout(Duration::from_millis(50), locks.lock("trade-1")).await;
        assert!(acquired.is_ok());
    }
}
