use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;

use super::cache_model::CacheEntry;
use super::cache_traits::CacheStore;
use crate::errors::Result;

/// In-process cache store, lost on restart.
#[derive(Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.read().unwrap_or_else(|poisoned| {
            warn!("Memory cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.write().unwrap_or_else(|poisoned| {
            warn!("Memory cache lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.read().get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.write().insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.write().remove(key).is_some())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut entries = self.write();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > cutoff);
        Ok(before - entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(key: &str, expires_in_secs: i64) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            key: key.to_string(),
            payload: serde_json::json!({"price": 1.0}),
            source: "TEST".to_string(),
            fetched_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
        }
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryCacheStore::new();
        store.put(entry("a", 60)).await.unwrap();

        assert_eq!(store.get("a").await.unwrap().unwrap().source, "TEST");
        assert!(store.delete("a").await.unwrap());
        assert!(!store.delete("a").await.unwrap());
        assert!(store.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryCacheStore::new();
        store.put(entry("old", -120)).await.unwrap();
        store.put(entry("fresh", 120)).await.unwrap();

        let removed = store.purge_expired(Utc::now()).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("fresh").await.unwrap().is_some());
    }
}
