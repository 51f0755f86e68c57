use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use log::warn;

use cryptodash_core::cache::{CacheEntry, CacheStore};
use cryptodash_core::Result;

use super::model::CacheEntryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::api_cache;
use crate::schema::api_cache::dsl::*;
use crate::utils::format_timestamp;

/// [`CacheStore`] backed by the `api_cache` table.
pub struct SqliteCacheRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SqliteCacheRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn get_impl(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut conn = get_connection(&self.pool)?;
        let row = api_cache
            .find(key)
            .select(CacheEntryDB::as_select())
            .first::<CacheEntryDB>(&mut conn)
            .optional()
            .map_err(StorageError::from)?;

        match row.map(CacheEntry::try_from).transpose() {
            Ok(entry) => Ok(entry),
            Err(e) => {
                // A row we cannot decode is as good as a miss.
                warn!("Ignoring corrupt cache row '{}': {}", key, e);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CacheStore for SqliteCacheRepository {
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        self.get_impl(key)
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        let row = CacheEntryDB::try_from(entry)?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(api_cache::table)
                    .values(&row)
                    .on_conflict(cache_key)
                    .do_update()
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let key = key.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<bool> {
                let removed = diesel::delete(api_cache.find(key))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(removed > 0)
            })
            .await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let cutoff = format_timestamp(cutoff);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(api_cache.filter(expires_at.le(cutoff)))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, run_migrations, spawn_writer};
    use chrono::Duration;
    use tempfile::{tempdir, TempDir};

    fn repository() -> (SqliteCacheRepository, TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.db").to_string_lossy().to_string();
        let pool = create_pool(&path).unwrap();
        run_migrations(&pool).unwrap();
        let writer = spawn_writer((*pool).clone());
        (SqliteCacheRepository::new(pool, writer), dir)
    }

    fn entry(key: &str, price: f64, expires_in_secs: i64) -> CacheEntry {
        let now = Utc::now();
        CacheEntry {
            key: key.to_string(),
            payload: serde_json::json!({ "price": price }),
            source: "KRAKEN".to_string(),
            fetched_at: now,
            expires_at: now + Duration::seconds(expires_in_secs),
        }
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (repo, _dir) = repository();
        repo.put(entry("ticker:BTC:-:0", 65000.0, 30)).await.unwrap();

        let got = repo.get("ticker:BTC:-:0").await.unwrap().unwrap();
        assert_eq!(got.payload["price"], 65000.0);
        assert_eq!(got.source, "KRAKEN");
        assert!(repo.get("ticker:ETH:-:0").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_existing_key() {
        let (repo, _dir) = repository();
        repo.put(entry("k", 1.0, 30)).await.unwrap();
        repo.put(entry("k", 2.0, 30)).await.unwrap();

        let got = repo.get("k").await.unwrap().unwrap();
        assert_eq!(got.payload["price"], 2.0);
    }

    #[tokio::test]
    async fn test_delete_and_purge() {
        let (repo, _dir) = repository();
        repo.put(entry("a", 1.0, -60)).await.unwrap();
        repo.put(entry("b", 1.0, -30)).await.unwrap();
        repo.put(entry("c", 1.0, 600)).await.unwrap();

        assert!(repo.delete("a").await.unwrap());
        assert!(!repo.delete("a").await.unwrap());

        assert_eq!(repo.purge_expired(Utc::now()).await.unwrap(), 1);
        assert!(repo.get("b").await.unwrap().is_none());
        assert!(repo.get("c").await.unwrap().is_some());
    }
}
