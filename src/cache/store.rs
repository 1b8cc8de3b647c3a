//! Cache Store Module
//!
//! Lock-guarded LRU of [`ByteView`]s, the local storage unit of a group.

use tokio::sync::Mutex;
use tracing::debug;

use crate::byteview::ByteView;
use crate::cache::{CacheStats, LruCache, OnEvicted};

#[derive(Debug)]
struct Inner {
    lru: LruCache<ByteView>,
    stats: CacheStats,
}

// == Cache Store ==
/// Thread-safe byte-budgeted cache.
///
/// Every operation serializes through one mutex, so no caller sees a
/// half-applied insert or eviction.
#[derive(Debug)]
pub struct CacheStore {
    inner: Mutex<Inner>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_bytes`; `max_bytes <= 0` never evicts.
    ///
    /// Evictions are logged at debug level.
    pub fn new(max_bytes: i64) -> Self {
        Self::with_on_evicted(
            max_bytes,
            Box::new(|key: &str, value: &ByteView| {
                debug!(key, bytes = value.len(), "evicted from cache");
            }),
        )
    }

    /// Creates a store that reports each evicted entry to `on_evicted`.
    pub fn with_on_evicted(max_bytes: i64, on_evicted: OnEvicted<ByteView>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                lru: LruCache::with_on_evicted(max_bytes, on_evicted),
                stats: CacheStats::new(),
            }),
        }
    }

    // == Get ==
    /// Returns the cached view and marks it most recently used.
    pub async fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock().await;
        let found = inner.lru.get(key).cloned();
        match found {
            Some(view) => {
                inner.stats.record_hit();
                Some(view)
            }
            None => {
                inner.stats.record_miss();
                None
            }
        }
    }

    // == Add ==
    /// Stores a view, evicting least recently used entries to stay in budget.
    pub async fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock().await;
        let evicted = inner.lru.add(key, value);
        inner.stats.record_evictions(evicted);
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let inner = self.inner.lock().await;
        let mut stats = inner.stats.clone();
        stats.set_occupancy(inner.lru.len(), inner.lru.used_bytes());
        stats
    }

    // == Length ==
    pub async fn len(&self) -> usize {
        self.inner.lock().await.lru.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.lru.is_empty()
    }

    /// Checks presence without affecting recency or stats.
    pub async fn contains(&self, key: &str) -> bool {
        self.inner.lock().await.lru.contains(key)
    }
}
