//! Result Cache
//!
//! Process-local, time-boxed memoization of gateway responses, keyed by
//! the canonical serialization of the query spec. Entries expire after
//! the validity window (five minutes by default); the manual refresh
//! control clears everything.
//!
//! The map sits behind a mutex because the runtime is multi-threaded,
//! but the lock is never held across an await. Two simultaneous misses
//! on one key may both fetch; the later write wins.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Default validity window for cached payloads.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    payload: Vec<String>,
    fetched_at: Instant,
}

/// Time-boxed cache of gateway result blocks
pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    /// Create a cache with a custom validity window
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache with the standard five-minute window
    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Number of entries currently held (expired entries included until
    /// they are overwritten or cleared)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all entries, returning how many were evicted
    pub fn clear(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let evicted = entries.len();
        entries.clear();
        tracing::debug!(evicted, "cache cleared");
        evicted
    }

    /// Return the cached payload for `key`, or await `fetch`, store its
    /// result, and return it. Fetch errors propagate and nothing is stored.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<Vec<String>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<String>, E>>,
    {
        if let Some(hit) = self.lookup(key) {
            tracing::debug!(key, "cache hit");
            return Ok(hit);
        }

        tracing::debug!(key, "cache miss");
        let payload = fetch().await?;
        self.insert(key, payload.clone());
        Ok(payload)
    }

    fn lookup(&self, key: &str) -> Option<Vec<String>> {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries
            .get(key)
            .filter(|entry| entry.fetched_at.elapsed() < self.ttl)
            .map(|entry| entry.payload.clone())
    }

    fn insert(&self, key: &str, payload: Vec<String>) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                payload,
                fetched_at: Instant::now(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    async fn counted_fetch(
        cache: &ResultCache,
        key: &str,
        calls: &AtomicUsize,
    ) -> Vec<String> {
        cache
            .get_or_fetch(key, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::convert::Infallible>(vec!["payload".to_string()])
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_second_call_within_window_hits_cache() {
        let cache = ResultCache::with_default_ttl();
        let calls = AtomicUsize::new(0);

        let first = counted_fetch(&cache, "spec", &calls).await;
        let second = counted_fetch(&cache, "spec", &calls).await;

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_refetches() {
        let cache = ResultCache::new(Duration::from_millis(20));
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, "spec", &calls).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        counted_fetch(&cache, "spec", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_forces_refetch() {
        let cache = ResultCache::with_default_ttl();
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, "spec", &calls).await;
        assert_eq!(cache.clear(), 1);
        counted_fetch(&cache, "spec", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = ResultCache::with_default_ttl();
        let calls = AtomicUsize::new(0);

        counted_fetch(&cache, "spec-a", &calls).await;
        counted_fetch(&cache, "spec-b", &calls).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_error_stores_nothing() {
        let cache = ResultCache::with_default_ttl();

        let result: Result<Vec<String>, &str> = cache
            .get_or_fetch("spec", || async { Err("upstream down") })
            .await;

        assert!(result.is_err());
        assert!(cache.is_empty());
    }
}
