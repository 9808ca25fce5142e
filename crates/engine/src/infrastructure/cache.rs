//! Capacity-bounded cache for memoized lookups.
//!
//! Provides a thread-safe cache with least-recently-used eviction to prevent
//! unbounded memory growth in long-running server processes.

use std::collections::HashMap;
use std::hash::Hash;

use tokio::sync::Mutex;

/// A thread-safe cache holding at most `capacity` entries.
///
/// Both `get` hits and `insert` count as a use. Inserting a new key into a full
/// cache evicts the least recently used entry. There is no ordering guarantee
/// between concurrent inserts of different keys.
pub struct BoundedCache<K, V> {
    inner: Mutex<CacheInner<K, V>>,
    capacity: usize,
}

struct CacheInner<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    /// Monotonic use counter; higher means more recently used.
    clock: u64,
}

struct CacheEntry<V> {
    value: V,
    last_used: u64,
}

impl<K, V> CacheInner<K, V> {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync,
    V: Clone + Send + Sync,
{
    /// Create a new cache. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::with_capacity(capacity),
                clock: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get a value and mark it as recently used.
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut guard = self.inner.lock().await;
        let now = guard.tick();
        guard.entries.get_mut(key).map(|entry| {
            entry.last_used = now;
            entry.value.clone()
        })
    }

    /// Insert a value, replacing any existing entry. Returns the evicted key, if any.
    pub async fn insert(&self, key: K, value: V) -> Option<K> {
        let mut guard = self.inner.lock().await;
        let now = guard.tick();

        let mut evicted = None;
        if !guard.entries.contains_key(&key) && guard.entries.len() >= self.capacity {
            evicted = guard
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = &evicted {
                guard.entries.remove(oldest);
            }
        }

        guard.entries.insert(
            key,
            CacheEntry {
                value,
                last_used: now,
            },
        );
        evicted
    }

    /// Check if a key exists without affecting recency.
    pub async fn contains(&self, key: &K) -> bool {
        self.inner.lock().await.entries.contains_key(key)
    }

    /// Get the current number of entries.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Check if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }
}
