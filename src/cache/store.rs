use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::core::RenderResult;

/// Default number of entries kept per cache.
pub const DEFAULT_CAPACITY: usize = 50;

/// Bounded LRU cache of render results.
///
/// Entries are immutable snapshots shared via `Arc`. A `get` promotes the
/// entry to most-recently-used; inserting past capacity evicts exactly one
/// least-recently-used entry. Operations never fail.
pub struct RenderCache {
    entries: Mutex<LruCache<String, Arc<RenderResult>>>,
}

impl RenderCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Look up a result, refreshing its recency on hit.
    pub fn get(&self, key: &str) -> Option<Arc<RenderResult>> {
        self.entries.lock().get(key).cloned()
    }

    /// Insert or replace a result.
    ///
    /// Replacing an existing key keeps the size unchanged and refreshes
    /// recency. Returns the evicted key, if an eviction happened.
    pub fn set(&self, key: impl Into<String>, result: Arc<RenderResult>) -> Option<String> {
        let key = key.into();
        let mut entries = self.entries.lock();
        match entries.push(key.clone(), result) {
            Some((old, _)) if old != key => {
                crate::debug!("cache"; "evicted {}", old);
                Some(old)
            }
            _ => None,
        }
    }

    /// Membership test without touching recency.
    pub fn has(&self, key: &str) -> bool {
        self.entries.lock().contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Default for RenderCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn svg(n: usize) -> Arc<RenderResult> {
        Arc::new(RenderResult::svg(format!("<svg id=\"{n}\"/>")))
    }

    #[test]
    fn test_get_set() {
        let cache = RenderCache::new(3);
        assert!(cache.get("a").is_none());

        let value = svg(1);
        cache.set("a", Arc::clone(&value));
        assert!(Arc::ptr_eq(&cache.get("a").unwrap(), &value));
        assert!(cache.has("a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache = RenderCache::new(3);
        cache.set("a", svg(1));
        cache.set("b", svg(2));
        cache.set("c", svg(3));

        let evicted = cache.set("d", svg(4));
        assert_eq!(evicted.as_deref(), Some("a"));
        assert!(!cache.has("a"));
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_get_promotes_entry() {
        let cache = RenderCache::new(3);
        cache.set("a", svg(1));
        cache.set("b", svg(2));
        cache.set("c", svg(3));

        cache.get("a");
        cache.set("d", svg(4));

        assert!(cache.has("a"));
        assert!(!cache.has("b"));
        assert!(cache.has("c"));
        assert!(cache.has("d"));
    }

    #[test]
    fn test_replace_keeps_size() {
        let cache = RenderCache::new(3);
        cache.set("a", svg(1));
        cache.set("b", svg(2));

        let replacement = svg(9);
        assert!(cache.set("a", Arc::clone(&replacement)).is_none());
        assert_eq!(cache.len(), 2);
        assert!(Arc::ptr_eq(&cache.get("a").unwrap(), &replacement));
    }

    #[test]
    fn test_replace_refreshes_recency() {
        let cache = RenderCache::new(2);
        cache.set("a", svg(1));
        cache.set("b", svg(2));
        cache.set("a", svg(3));

        assert_eq!(cache.set("c", svg(4)).as_deref(), Some("b"));
        assert!(cache.has("a"));
    }

    #[test]
    fn test_capacity_one() {
        let cache = RenderCache::new(1);
        cache.set("a", svg(1));
        cache.set("b", svg(2));
        assert_eq!(cache.len(), 1);
        assert!(cache.has("b"));
        assert!(!cache.has("a"));
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let cache = RenderCache::new(0);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(RenderCache::default().capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_clear() {
        let cache = RenderCache::new(3);
        cache.set("a", svg(1));
        cache.set("b", svg(2));
        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get("a").is_none());
    }
}
