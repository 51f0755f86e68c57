use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::cache_model::{CacheEntry, CacheStatus, Cached};
use super::cache_traits::CacheStore;
use crate::errors::Result;

/// How long past expiry an entry may still be served when upstream fails.
pub const DEFAULT_STALE_GRACE: Duration = Duration::from_secs(24 * 60 * 60);

/// Read-through cache over a [`CacheStore`].
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn CacheStore>,
    stale_grace: Duration,
}

fn chrono_duration(d: Duration) -> chrono::Duration {
    chrono::Duration::from_std(d).unwrap_or_else(|_| chrono::Duration::days(365))
}

impl TtlCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            stale_grace: DEFAULT_STALE_GRACE,
        }
    }

    pub fn with_stale_grace(mut self, grace: Duration) -> Self {
        self.stale_grace = grace;
        self
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Serve `key` from the store while fresh, otherwise call `fetch` and
    /// store the result for `ttl`.
    ///
    /// `fetch` yields the value and the id of whoever produced it. When it
    /// fails, an expired entry fetched within the stale grace is returned
    /// with [`CacheStatus::Stale`] instead of the error.
    pub async fn get_or_fetch<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<Cached<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(T, String)>>,
    {
        let now = Utc::now();
        let existing = match self.store.get(key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        };

        if let Some(entry) = existing.as_ref().filter(|e| e.is_fresh(now)) {
            match serde_json::from_value::<T>(entry.payload.clone()) {
                Ok(data) => {
                    debug!("Cache hit: {}", key);
                    return Ok(Cached {
                        data,
                        status: CacheStatus::Hit,
                        source: entry.source.clone(),
                        fetched_at: entry.fetched_at,
                    });
                }
                Err(e) => warn!("Discarding undecodable cache entry {}: {}", key, e),
            }
        }

        match fetch().await {
            Ok((data, source)) => {
                let fetched_at = Utc::now();
                match serde_json::to_value(&data) {
                    Ok(payload) => {
                        let entry = CacheEntry {
                            key: key.to_string(),
                            payload,
                            source: source.clone(),
                            fetched_at,
                            expires_at: fetched_at + chrono_duration(ttl),
                        };
                        if let Err(e) = self.store.put(entry).await {
                            warn!("Cache write failed for {}: {}", key, e);
                        }
                    }
                    Err(e) => warn!("Could not serialize {} for caching: {}", key, e),
                }
                Ok(Cached {
                    data,
                    status: CacheStatus::Miss,
                    source,
                    fetched_at,
                })
            }
            Err(err) => {
                let cutoff = now - chrono_duration(self.stale_grace);
                if let Some(entry) = existing.filter(|e| e.fetched_at > cutoff) {
                    if let Ok(data) = serde_json::from_value::<T>(entry.payload) {
                        warn!("Serving stale {} after upstream failure: {}", key, err);
                        return Ok(Cached {
                            data,
                            status: CacheStatus::Stale,
                            source: entry.source,
                            fetched_at: entry.fetched_at,
                        });
                    }
                }
                Err(err)
            }
        }
    }

    /// Drop entries that are past expiry and outside the stale grace.
    pub async fn purge_expired(&self) -> Result<usize> {
        let cutoff = Utc::now() - chrono_duration(self.stale_grace);
        let removed = self.store.purge_expired(cutoff).await?;
        if removed > 0 {
            debug!("Purged {} expired cache entries", removed);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::errors::Error;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration as ChronoDuration};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn entry(key: &str, value: f64, fetched_ago: i64, expires_in: i64) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            key: key.to_string(),
            payload: serde_json::json!(value),
            source: "CACHED".to_string(),
            fetched_at: now - ChronoDuration::seconds(fetched_ago),
            expires_at: now + ChronoDuration::seconds(expires_in),
        }
    }

    fn upstream_down() -> Error {
        Error::Unexpected("upstream down".to_string())
    }

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = TtlCache::new(Arc::new(MemoryCacheStore::new()));
        let calls = AtomicUsize::new(0);

        for expected in [CacheStatus::Miss, CacheStatus::Hit] {
            let got = cache
                .get_or_fetch("k", Duration::from_secs(60), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok((42.0_f64, "KRAKEN".to_string()))
                })
                .await
                .unwrap();
            assert_eq!(got.status, expected);
            assert_eq!(got.data, 42.0);
            assert_eq!(got.source, "KRAKEN");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let store = Arc::new(MemoryCacheStore::new());
        store.put(entry("k", 1.0, 120, -60)).await.unwrap();
        let cache = TtlCache::new(store);

        let got = cache
            .get_or_fetch("k", Duration::from_secs(60), || async {
                Ok((2.0_f64, "KRAKEN".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(got.status, CacheStatus::Miss);
        assert_eq!(got.data, 2.0);
    }

    #[tokio::test]
    async fn test_stale_served_on_failure() {
        let store = Arc::new(MemoryCacheStore::new());
        store.put(entry("k", 1.0, 3600, -3000)).await.unwrap();
        let cache = TtlCache::new(store);

        let got = cache
            .get_or_fetch::<f64, _, _>("k", Duration::from_secs(60), || async {
                Err(upstream_down())
            })
            .await
            .unwrap();
        assert_eq!(got.status, CacheStatus::Stale);
        assert_eq!(got.data, 1.0);
        assert_eq!(got.source, "CACHED");
    }

    #[tokio::test]
    async fn test_too_old_stale_entry_propagates_error() {
        let store = Arc::new(MemoryCacheStore::new());
        store.put(entry("k", 1.0, 25 * 3600, -24 * 3600)).await.unwrap();
        let cache = TtlCache::new(store);

        let result = cache
            .get_or_fetch::<f64, _, _>("k", Duration::from_secs(60), || async {
                Err(upstream_down())
            })
            .await;
        assert!(matches!(result, Err(Error::Unexpected(_))));
    }

    #[tokio::test]
    async fn test_custom_stale_grace() {
        let store = Arc::new(MemoryCacheStore::new());
        store.put(entry("k", 1.0, 3600, -3000)).await.unwrap();

        let strict = TtlCache::new(store.clone()).with_stale_grace(Duration::from_secs(600));
        let result = strict
            .get_or_fetch::<f64, _, _>("k", Duration::from_secs(60), || async {
                Err(upstream_down())
            })
            .await;
        assert!(matches!(result, Err(Error::Unexpected(_))));
        assert_eq!(strict.purge_expired().await.unwrap(), 1);
        assert!(store.get("k").await.unwrap().is_none());
    }

    struct BrokenStore;

    #[async_trait]
    impl CacheStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
            Err(Error::Unexpected("read".to_string()))
        }
        async fn put(&self, _entry: CacheEntry) -> Result<()> {
            Err(Error::Unexpected("write".to_string()))
        }
        async fn delete(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }
        async fn purge_expired(&self, _cutoff: DateTime<Utc>) -> Result<usize> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_store_failures_do_not_fail_request() {
        let cache = TtlCache::new(Arc::new(BrokenStore));
        let got = cache
            .get_or_fetch("k", Duration::from_secs(60), || async {
                Ok((7.0_f64, "TATUM".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(got.status, CacheStatus::Miss);
        assert_eq!(got.data, 7.0);
    }

    #[tokio::test]
    async fn test_purge_keeps_entries_within_grace() {
        let store = Arc::new(MemoryCacheStore::new());
        store.put(entry("recent", 1.0, 120, -60)).await.unwrap();
        store.put(entry("ancient", 1.0, 49 * 3600, -48 * 3600)).await.unwrap();
        let cache = TtlCache::new(store.clone());

        assert_eq!(cache.purge_expired().await.unwrap(), 1);
        assert!(store.get("recent").await.unwrap().is_some());
    }
}
