//! In-memory TTL cache.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use lru::LruCache;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Cache entry. Never mutated in place; a re-fetch overwrites it.
#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() > ttl
    }
}

/// Cache configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries before LRU eviction kicks in
    pub max_entries: usize,
    /// Time-to-live shared by every entry of the cache
    pub ttl: Duration,
}

impl CacheConfig {
    /// Creates a configuration with the given TTL and default capacity.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Default::default()
        }
    }

    /// Sets the capacity.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 1000,
            ttl: Duration::from_secs(30),
        }
    }
}

/// In-memory cache keyed by string.
///
/// Thread-safe. Entries older than the TTL are removed the first time they are
/// read, so a stale value is never returned twice.
pub struct TtlCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    config: CacheConfig,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> TtlCache<V> {
    /// Creates a cache with the given TTL and default capacity.
    pub fn new(ttl: Duration) -> Self {
        Self::with_config(CacheConfig::new(ttl))
    }

    /// Creates a cache with custom configuration.
    pub fn with_config(config: CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            config,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached value if it is no older than the TTL.
    ///
    /// An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        let expired = match entries.get(key) {
            Some(entry) if !entry.is_expired(self.config.ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Writes the value with the current timestamp, replacing any previous entry.
    pub fn set(&self, key: impl Into<String>, value: V) {
        let mut entries = self.entries.lock();
        let key = key.into();

        // Prefer dropping stale entries over evicting live ones.
        if !entries.contains(&key) && entries.len() >= entries.cap().get() {
            let ttl = self.config.ttl;
            Self::cleanup_expired_internal(&mut entries, ttl);
        }

        entries.put(
            key,
            CacheEntry {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Removes a cached entry.
    pub fn remove(&self, key: &str) {
        self.entries.lock().pop(key);
    }

    /// Clears all cached entries.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Removes all expired entries, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        Self::cleanup_expired_internal(&mut entries, self.config.ttl)
    }

    fn cleanup_expired_internal(entries: &mut LruCache<String, CacheEntry<V>>, ttl: Duration) -> usize {
        let stale: Vec<String> = entries
            .iter()
            .filter(|(_, e)| e.is_expired(ttl))
            .map(|(k, _)| k.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }
        stale.len()
    }

    /// Returns the TTL of this cache.
    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }

    /// Returns the number of cached entries (including not-yet-swept expired ones).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let expired = entries
            .iter()
            .filter(|(_, e)| e.is_expired(self.config.ttl))
            .count();
        CacheStats {
            total_entries: entries.len(),
            expired_entries: expired,
            valid_entries: entries.len().saturating_sub(expired),
            capacity: entries.cap().get(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Total entries (including expired)
    pub total_entries: usize,
    /// Expired entries
    pub expired_entries: usize,
    /// Valid (non-expired) entries
    pub valid_entries: usize,
    /// Maximum capacity
    pub capacity: usize,
    /// Lookups served from cache
    pub hits: u64,
    /// Lookups that missed or found an expired entry
    pub misses: u64,
}

impl std::ops::Add for CacheStats {
    type Output = CacheStats;

    fn add(self, other: CacheStats) -> CacheStats {
        CacheStats {
            total_entries: self.total_entries + other.total_entries,
            expired_entries: self.expired_entries + other.expired_entries,
            valid_entries: self.valid_entries + other.valid_entries,
            capacity: self.capacity + other.capacity,
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(30);

    #[test]
    fn test_cache_set_get() {
        let cache = TtlCache::new(TTL);
        cache.set("user_info:alice", 42u32);
        assert_eq!(cache.get("user_info:alice"), Some(42));
    }

    #[test]
    fn test_cache_miss() {
        let cache: TtlCache<u32> = TtlCache::new(TTL);
        assert!(cache.get("user_info:nobody").is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn test_cache_overwrite() {
        let cache = TtlCache::new(TTL);
        cache.set("k", "old");
        cache.set("k", "new");
        assert_eq!(cache.get("k"), Some("new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_keys_are_exact() {
        let cache = TtlCache::new(TTL);
        cache.set("user_feed:alice:QVFE", 1);
        assert!(cache.get("user_feed:alice:qvfe").is_none());
    }

    #[test]
    fn test_cache_remove() {
        let cache = TtlCache::new(TTL);
        cache.set("k", 1);
        cache.remove("k");
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_cache_clear() {
        let cache = TtlCache::new(TTL);
        cache.set("a", 1);
        cache.set("b", 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_valid_at_exact_ttl() {
        let cache = TtlCache::new(TTL);
        cache.set("k", 1);
        tokio::time::advance(TTL).await;
        assert_eq!(cache.get("k"), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_ttl_expiration_removes_entry() {
        let cache = TtlCache::new(TTL);
        cache.set("k", 1);
        tokio::time::advance(TTL + Duration::from_millis(1)).await;

        assert!(cache.get("k").is_none());
        assert_eq!(cache.len(), 0);
        // No resurrection on the next lookup.
        assert!(cache.get("k").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_refresh_resets_age() {
        let cache = TtlCache::new(TTL);
        cache.set("k", 1);
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.set("k", 2);
        tokio::time::advance(Duration::from_secs(20)).await;
        assert_eq!(cache.get("k"), Some(2));
    }

    #[test]
    fn test_cache_capacity_eviction() {
        let cache = TtlCache::with_config(CacheConfig::new(TTL).with_max_entries(2));
        cache.set("a", 1);
        cache.set("b", 2);
        // Touch "a" so "b" becomes least recently used.
        assert_eq!(cache.get("a"), Some(1));
        cache.set("c", 3);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("b").is_none());
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.get("c"), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_full_prefers_dropping_expired() {
        let cache = TtlCache::with_config(CacheConfig::new(TTL).with_max_entries(2));
        cache.set("stale", 1);
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.set("fresh", 2);
        tokio::time::advance(Duration::from_secs(15)).await;
        cache.set("new", 3);

        assert_eq!(cache.get("fresh"), Some(2));
        assert_eq!(cache.get("new"), Some(3));
    }

    #[test]
    fn test_cache_zero_capacity_clamped() {
        let cache = TtlCache::with_config(CacheConfig::new(TTL).with_max_entries(0));
        cache.set("a", 1);
        assert_eq!(cache.get("a"), Some(1));
        assert_eq!(cache.stats().capacity, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_stats() {
        let cache = TtlCache::new(TTL);
        cache.set("a", 1);
        cache.set("b", 2);
        let _ = cache.get("a");
        tokio::time::advance(TTL * 2).await;
        cache.set("c", 3);

        let stats = cache.stats();
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.expired_entries, 2);
        assert_eq!(stats.valid_entries, 1);
        assert_eq!(stats.hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cache_cleanup_expired() {
        let cache = TtlCache::new(TTL);
        cache.set("a", 1);
        tokio::time::advance(TTL * 2).await;
        cache.set("b", 2);

        assert_eq!(cache.cleanup_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("b"), Some(2));
    }

    #[test]
    fn test_stats_add() {
        let a = CacheStats { total_entries: 1, capacity: 10, hits: 2, ..Default::default() };
        let b = CacheStats { total_entries: 2, capacity: 10, misses: 1, ..Default::default() };
        let sum = a + b;
        assert_eq!(sum.total_entries, 3);
        assert_eq!(sum.capacity, 20);
        assert_eq!(sum.hits, 2);
        assert_eq!(sum.misses, 1);
    }
}
