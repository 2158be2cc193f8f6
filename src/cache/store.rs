//! Cache storage for backend responses.
//!
//! Entries are keyed by request signature and replaced wholesale on
//! refresh; nothing mutates a stored payload in place.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::metrics::PerformanceMonitor;

use super::config::CachePolicy;
use super::keys::RequestSignature;
use crate::sync::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT: &str = "corriere_cache_hit_total";
const METRIC_CACHE_MISS: &str = "corriere_cache_miss_total";
const METRIC_CACHE_STALE_HIT: &str = "corriere_cache_stale_hit_total";

/// A cached backend payload with its freshness bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    data: Value,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.stored_at)
    }

    /// Fresh: age strictly below the entry's TTL.
    fn is_fresh(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }

    /// Usable-stale: age strictly below the stale-while-revalidate window,
    /// regardless of TTL expiry.
    fn is_usable_stale(&self, now: Instant, stale_window: Duration) -> bool {
        self.age(now) < stale_window
    }
}

/// Diagnostic snapshot of the store's contents.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub keys: Vec<String>,
}

/// Request-signature keyed cache with TTL freshness and a stale window.
pub struct CacheStore {
    policy: CachePolicy,
    entries: RwLock<HashMap<String, CacheEntry>>,
    monitor: Arc<PerformanceMonitor>,
}

impl CacheStore {
    pub fn new(policy: CachePolicy, monitor: Arc<PerformanceMonitor>) -> Self {
        Self {
            policy,
            entries: RwLock::new(HashMap::new()),
            monitor,
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Return the entry's payload if it is fresh (within TTL).
    ///
    /// Records a cache-hit or cache-miss metric as a side effect.
    pub fn get<T: DeserializeOwned>(&self, signature: &RequestSignature) -> Option<T> {
        if !self.policy.enabled || !signature.is_cacheable() {
            self.record_miss(signature);
            return None;
        }

        let key = signature.cache_key();
        let now = Instant::now();
        let payload = {
            let entries = rw_read(&self.entries, SOURCE, "get");
            entries
                .get(&key)
                .filter(|entry| entry.is_fresh(now))
                .map(|entry| entry.data.clone())
        };

        match payload {
            Some(value) => match serde_json::from_value(value) {
                Ok(decoded) => {
                    self.record_hit(signature);
                    Some(decoded)
                }
                Err(err) => {
                    warn!(
                        target: "corriere::cache",
                        key = %key,
                        error = %err,
                        "cached payload no longer deserializes, treating as miss"
                    );
                    self.record_miss(signature);
                    None
                }
            },
            None => {
                self.record_miss(signature);
                None
            }
        }
    }

    /// Return the entry's payload if it is within the stale-while-revalidate
    /// window, regardless of TTL expiry. Used to serve instantly while a
    /// background refresh runs; does not count toward hit/miss rate.
    pub fn get_stale<T: DeserializeOwned>(&self, signature: &RequestSignature) -> Option<T> {
        if !self.policy.enabled || !signature.is_cacheable() {
            return None;
        }

        let key = signature.cache_key();
        let now = Instant::now();
        let stale_window = self.policy.stale_window();
        let payload = {
            let entries = rw_read(&self.entries, SOURCE, "get_stale");
            entries
                .get(&key)
                .filter(|entry| entry.is_usable_stale(now, stale_window))
                .map(|entry| entry.data.clone())
        };

        let value = payload?;
        match serde_json::from_value(value) {
            Ok(decoded) => {
                counter!(METRIC_CACHE_STALE_HIT).increment(1);
                debug!(target: "corriere::cache", key = %key, "serving stale entry");
                Some(decoded)
            }
            Err(err) => {
                warn!(
                    target: "corriere::cache",
                    key = %key,
                    error = %err,
                    "stale payload no longer deserializes, skipping"
                );
                None
            }
        }
    }

    /// Store a payload under the signature with the configured TTL.
    ///
    /// No-op for non-cacheable signatures (POST) and when the cache is
    /// disabled. The previous entry, if any, is replaced wholesale.
    pub fn set<T: Serialize>(&self, signature: &RequestSignature, data: &T) {
        if !self.policy.enabled || !signature.is_cacheable() {
            return;
        }

        let value = match serde_json::to_value(data) {
            Ok(value) => value,
            Err(err) => {
                warn!(
                    target: "corriere::cache",
                    key = %signature.cache_key(),
                    error = %err,
                    "payload failed to serialize, not caching"
                );
                return;
            }
        };

        let entry = CacheEntry {
            data: value,
            stored_at: Instant::now(),
            ttl: self.policy.ttl(),
        };

        let key = signature.cache_key();
        rw_write(&self.entries, SOURCE, "set").insert(key, entry);
    }

    /// Remove all entries whose key contains `fragment`, or every entry when
    /// no fragment is given.
    pub fn clear(&self, fragment: Option<&str>) {
        let mut entries = rw_write(&self.entries, SOURCE, "clear");
        match fragment {
            Some(fragment) => entries.retain(|key, _| !key.contains(fragment)),
            None => entries.clear(),
        }
    }

    /// Diagnostic snapshot: entry count and sorted keys.
    pub fn stats(&self) -> CacheStats {
        let entries = rw_read(&self.entries, SOURCE, "stats");
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        CacheStats {
            size: entries.len(),
            keys,
        }
    }

    fn record_hit(&self, signature: &RequestSignature) {
        counter!(METRIC_CACHE_HIT).increment(1);
        debug!(
            target: "corriere::cache",
            endpoint = signature.endpoint(),
            outcome = "hit",
            "cache lookup"
        );
        self.monitor.record_cache_hit();
    }

    fn record_miss(&self, signature: &RequestSignature) {
        counter!(METRIC_CACHE_MISS).increment(1);
        debug!(
            target: "corriere::cache",
            endpoint = signature.endpoint(),
            outcome = "miss",
            "cache lookup"
        );
        self.monitor.record_cache_miss();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::time::{Duration, advance};

    use super::*;

    fn store_with_policy(policy: CachePolicy) -> CacheStore {
        CacheStore::new(policy, Arc::new(PerformanceMonitor::new(128)))
    }

    fn test_policy() -> CachePolicy {
        CachePolicy {
            enabled: true,
            ttl_seconds: 300,
            stale_while_revalidate_seconds: 600,
            max_age_seconds: 3600,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_is_served_until_ttl_expires() {
        let store = store_with_policy(test_policy());
        let sig = RequestSignature::get("blog-posts?limit=10");

        store.set(&sig, &json!({"docs": ["a"]}));

        let hit: Option<Value> = store.get(&sig);
        assert!(hit.is_some());

        // One second shy of the TTL boundary: still fresh.
        advance(Duration::from_secs(299)).await;
        let hit: Option<Value> = store.get(&sig);
        assert!(hit.is_some());

        // At the boundary the entry is no longer fresh.
        advance(Duration::from_secs(1)).await;
        let miss: Option<Value> = store.get(&sig);
        assert!(miss.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_window_serves_after_ttl_expiry() {
        let store = store_with_policy(test_policy());
        let sig = RequestSignature::get("case-studies");

        store.set(&sig, &json!({"docs": []}));
        advance(Duration::from_secs(400)).await;

        // Past TTL: get misses, get_stale still serves.
        let miss: Option<Value> = store.get(&sig);
        assert!(miss.is_none());
        let stale: Option<Value> = store.get_stale(&sig);
        assert!(stale.is_some());

        // Past the stale window: both miss.
        advance(Duration::from_secs(200)).await;
        let gone: Option<Value> = store.get_stale(&sig);
        assert!(gone.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn post_signatures_are_never_stored() {
        let store = store_with_policy(test_policy());
        let sig = RequestSignature::post("search", json!({"q": "cms"}));

        store.set(&sig, &json!({"docs": []}));

        assert_eq!(store.stats().size, 0);
        let miss: Option<Value> = store.get(&sig);
        assert!(miss.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_cache_stores_nothing() {
        let store = store_with_policy(CachePolicy {
            enabled: false,
            ..test_policy()
        });
        let sig = RequestSignature::get("blog-posts");

        store.set(&sig, &json!({"docs": []}));
        assert_eq!(store.stats().size, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_replaces_entry_wholesale() {
        let store = store_with_policy(test_policy());
        let sig = RequestSignature::get("team-members");

        store.set(&sig, &json!({"docs": ["old"]}));
        store.set(&sig, &json!({"docs": ["new"]}));

        let latest: Value = store.get(&sig).expect("entry present");
        assert_eq!(latest, json!({"docs": ["new"]}));
        assert_eq!(store.stats().size, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn clear_by_fragment_removes_matching_keys_only() {
        let store = store_with_policy(test_policy());
        let posts = RequestSignature::get("blog-posts?limit=10");
        let studies = RequestSignature::get("case-studies?limit=10");

        store.set(&posts, &json!(1));
        store.set(&studies, &json!(2));

        store.clear(Some("blog-posts"));
        let stats = store.stats();
        assert_eq!(stats.size, 1);
        assert!(stats.keys[0].contains("case-studies"));

        store.clear(None);
        assert_eq!(store.stats().size, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hits_and_misses_feed_the_monitor() {
        let monitor = Arc::new(PerformanceMonitor::new(128));
        let store = CacheStore::new(test_policy(), Arc::clone(&monitor));
        let sig = RequestSignature::get("blog-posts");

        let miss: Option<Value> = store.get(&sig);
        assert!(miss.is_none());

        store.set(&sig, &json!({"docs": []}));
        for _ in 0..3 {
            let hit: Option<Value> = store.get(&sig);
            assert!(hit.is_some());
        }

        // 3 hits, 1 miss.
        let summary = monitor.summary();
        assert_eq!(summary.cache_hit_rate, 75.0);
    }
}
