//! TTL cache for lookup tables.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use lru::LruCache;
use tokio::time::Instant;

/// Well-known cache keys.
pub mod keys {
    /// Prefix shared by every lookup table key.
    pub const LOOKUP_PREFIX: &str = "lookup:";

    /// Departments and units ("khoa/phòng").
    pub const DEPARTMENTS: &str = "lookup:departments";

    /// Personnel positions.
    pub const POSITIONS: &str = "lookup:positions";

    /// Quality indicator groups.
    pub const INDICATOR_GROUPS: &str = "lookup:indicator_groups";

    /// Catalogue of the 83 assessment criteria.
    pub const CRITERIA: &str = "lookup:criteria";
}

/// A cached value.
#[derive(Debug, Clone)]
pub struct CachedEntry<V> {
    /// Stored value.
    pub value: V,

    /// Moment the value was stored.
    pub stored_at: Instant,
}

impl<V> CachedEntry<V> {
    /// Creates an entry stamped with the current time.
    pub fn new(value: V) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    /// Fresh while less than `ttl` has elapsed since it was stored.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Current number of entries, fresh or stale.
    pub size: usize,

    /// Maximum capacity.
    pub capacity: usize,

    /// Number of cache hits.
    pub hits: u64,

    /// Number of cache misses.
    pub misses: u64,
}

impl CacheStats {
    /// Calculates the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Time-expiring memo keyed by string.
///
/// Stale entries are not swept; they are detected when read and replaced
/// by the next successful fetch. Concurrent fetches of the same cold key
/// all run their fetcher and the last one to finish wins.
pub struct TtlCache<V> {
    entries: Mutex<LruCache<String, CachedEntry<V>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn entries(&self) -> MutexGuard<'_, LruCache<String, CachedEntry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the value for `key` if it is still fresh.
    pub fn get(&self, key: &str, ttl: Duration) -> Option<V> {
        let mut entries = self.entries();

        let fresh = entries.peek(key).map(|e| e.is_fresh(ttl)).unwrap_or(false);
        if fresh {
            self.hits.fetch_add(1, Ordering::Relaxed);
            entries.get(key).map(|e| e.value.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Stores `value` under `key`, replacing any previous entry.
    pub fn insert(&self, key: impl Into<String>, value: V) {
        self.entries().put(key.into(), CachedEntry::new(value));
    }

    /// Returns the fresh value for `key`, or runs `fetcher` and stores its result.
    ///
    /// A failing fetcher leaves the cache untouched and its error is
    /// returned as-is.
    pub async fn cached_fetch<F, Fut, E>(&self, key: &str, fetcher: F, ttl: Duration) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key, ttl) {
            tracing::debug!(key, "Cache hit");
            return Ok(value);
        }

        tracing::debug!(key, "Cache miss, fetching");
        let value = fetcher().await?;
        self.insert(key, value.clone());

        Ok(value)
    }

    /// Removes one entry. Missing keys are ignored.
    pub fn invalidate(&self, key: &str) {
        if self.entries().pop(key).is_some() {
            tracing::debug!(key, "Cache entry invalidated");
        }
    }

    /// Removes every entry whose key starts with `prefix`.
    pub fn invalidate_by_prefix(&self, prefix: &str) {
        let mut entries = self.entries();

        let matching: Vec<String> = entries
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &matching {
            entries.pop(key);
        }

        tracing::debug!(prefix, removed = matching.len(), "Cache prefix invalidated");
    }

    /// Empties the cache.
    pub fn clear_all(&self) {
        self.entries().clear();
        tracing::debug!("Cache cleared");
    }

    /// Whether `key` has an entry, fresh or stale.
    pub fn contains(&self, key: &str) -> bool {
        self.entries().contains(key)
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries();
        CacheStats {
            size: entries.len(),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new(256)
    }
}
