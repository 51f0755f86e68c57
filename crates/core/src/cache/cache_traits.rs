use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::cache_model::CacheEntry;
use crate::errors::Result;

/// Persistence for cached responses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Insert or replace the entry for `entry.key`.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<bool>;

    /// Remove entries whose `expires_at` is at or before `cutoff`. Returns
    /// how many were removed.
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize>;
}
