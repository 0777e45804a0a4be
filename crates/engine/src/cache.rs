//! Time-bounded memoization for upstream responses
//!
//! One `TtlCache` per route, owned by the server state. Entries expire after
//! the configured TTL; a failed refresh leaves the previous entry untouched
//! and is never cached.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::debug;

struct Entry<V> {
    value: V,
    expires_at: Instant,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh value for `key`, if any
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap();
        entries
            .get(key)
            .filter(|e| e.expires_at > Instant::now())
            .map(|e| e.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .write()
            .unwrap()
            .insert(key, Entry { value, expires_at });
    }

    pub fn invalidate(&self, key: &K) {
        self.entries.write().unwrap().remove(key);
    }

    /// Return the cached value, or run `compute` and cache its success.
    ///
    /// Concurrent misses may both compute; the last writer wins. No lock is
    /// held across the `.await`.
    pub async fn get_or_try_insert_with<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            debug!(key = ?key, "Cache hit");
            return Ok(value);
        }

        debug!(key = ?key, "Cache miss");
        let value = compute().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop expired entries
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_hit_skips_compute() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(30));
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let v: Result<u32, ()> = cache
                .get_or_try_insert_with("models", || async {
                    calls.fetch_add(1, Ordering::Relaxed);
                    Ok(7)
                })
                .await;
            assert_eq!(v, Ok(7));
        }
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_recomputes() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let _: Result<u32, ()> = cache
                .get_or_try_insert_with("prices", || async {
                    Ok(calls.fetch_add(1, Ordering::Relaxed))
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::Relaxed), 3);
        assert_eq!(cache.get(&"prices"), None);
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_errors_are_not_cached() {
        let cache: TtlCache<String, u32> = TtlCache::new(Duration::from_secs(60));

        let failed: Result<u32, &str> = cache
            .get_or_try_insert_with("seasons".to_string(), || async { Err("upstream down") })
            .await;
        assert_eq!(failed, Err("upstream down"));
        assert!(cache.is_empty());

        let ok: Result<u32, &str> = cache
            .get_or_try_insert_with("seasons".to_string(), || async { Ok(3) })
            .await;
        assert_eq!(ok, Ok(3));
        assert_eq!(cache.get(&"seasons".to_string()), Some(3));
    }

    #[test]
    fn test_keys_are_independent() {
        let cache: TtlCache<String, &str> = TtlCache::new(Duration::from_secs(60));
        cache.insert("status=active".into(), "a");
        cache.insert("status=".into(), "b");
        assert_eq!(cache.get(&"status=active".into()), Some("a"));
        cache.invalidate(&"status=active".into());
        assert_eq!(cache.get(&"status=active".into()), None);
        assert_eq!(cache.get(&"status=".into()), Some("b"));
        assert_eq!(cache.len(), 1);
    }
}
