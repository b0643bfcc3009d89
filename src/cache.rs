//! Short-lived cache of remote search results keyed by query.
//!
//! Avoids hitting the remote API again while a user keeps refining or
//! re-entering the same query. Keys are the trimmed, lowercased query.

use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use lru::LruCache;

use crate::remote::RemoteResult;

pub const DEFAULT_CACHE_CAPACITY: usize = 256;

struct CacheEntry {
    stored_at: Instant,
    results: Vec<RemoteResult>,
}

/// Bounded TTL cache of raw remote results.
///
/// Once full, the least recently used query is evicted.
pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<LruCache<String, CacheEntry>>,
}

impl QueryCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            ttl,
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Cache key for `query`: trimmed and lowercased.
    pub fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    /// Cached results for `query`, if stored within the TTL.
    pub fn get(&self, query: &str) -> Option<Vec<RemoteResult>> {
        if self.ttl.is_zero() {
            return None;
        }
        let key = Self::key(query);
        let mut entries = self.entries.lock().ok()?;
        let entry = entries.get(&key)?;
        if entry.stored_at.elapsed() < self.ttl {
            return Some(entry.results.clone());
        }
        entries.pop(&key);
        None
    }

    /// Store results for `query`.
    pub fn insert(&self, query: &str, results: Vec<RemoteResult>) {
        if self.ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.put(
                Self::key(query),
                CacheEntry {
                    stored_at: Instant::now(),
                    results,
                },
            );
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::mock_symbol;

    #[test]
    fn test_hit_is_keyed_by_normalized_query() {
        let cache = QueryCache::new(Duration::from_secs(60), 8);
        cache.insert("  Apple ", vec![mock_symbol(1, "apple")]);

        let hit = cache.get("apple").expect("cached");
        assert_eq!(hit[0].label, "apple");
        assert!(cache.get("apples").is_none());
    }

    #[test]
    fn test_entries_expire() {
        let cache = QueryCache::new(Duration::from_millis(20), 8);
        cache.insert("apple", vec![mock_symbol(1, "apple")]);
        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get("apple").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_capacity_evicts_least_recently_used() {
        let cache = QueryCache::new(Duration::from_secs(60), 2);
        cache.insert("one", vec![]);
        cache.insert("two", vec![]);
        // Touch "one" so "two" becomes the eviction candidate
        assert!(cache.get("one").is_some());
        cache.insert("three", vec![]);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("one").is_some());
        assert!(cache.get("two").is_none());
        assert!(cache.get("three").is_some());
    }

    #[test]
    fn test_reinsert_replaces_entry() {
        let cache = QueryCache::new(Duration::from_secs(60), 2);
        cache.insert("Apple", vec![mock_symbol(1, "apple")]);
        cache.insert("apple ", vec![mock_symbol(2, "apple sauce")]);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("APPLE").expect("cached")[0].label, "apple sauce");
    }

    #[test]
    fn test_zero_capacity_still_holds_one_query() {
        let cache = QueryCache::new(Duration::from_secs(60), 0);
        cache.insert("one", vec![]);
        cache.insert("two", vec![]);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("two").is_some());
    }

    #[test]
    fn test_zero_ttl_disables_caching() {
        let cache = QueryCache::new(Duration::ZERO, 8);
        cache.insert("apple", vec![mock_symbol(1, "apple")]);
        assert!(cache.get("apple").is_none());
        assert!(cache.is_empty());
    }
}
