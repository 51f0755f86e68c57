//! Database model for cached provider responses.

use diesel::prelude::*;

use cryptodash_core::cache::CacheEntry;

use crate::errors::StorageError;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::api_cache)]
#[diesel(primary_key(cache_key))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CacheEntryDB {
    pub cache_key: String,
    pub payload: String,
    pub source: String,
    pub fetched_at: String,
    pub expires_at: String,
}

impl TryFrom<CacheEntry> for CacheEntryDB {
    type Error = StorageError;

    fn try_from(entry: CacheEntry) -> Result<Self, Self::Error> {
        Ok(Self {
            cache_key: entry.key,
            payload: serde_json::to_string(&entry.payload)?,
            source: entry.source,
            fetched_at: format_timestamp(entry.fetched_at),
            expires_at: format_timestamp(entry.expires_at),
        })
    }
}

impl TryFrom<CacheEntryDB> for CacheEntry {
    type Error = StorageError;

    fn try_from(row: CacheEntryDB) -> Result<Self, Self::Error> {
        Ok(Self {
            payload: serde_json::from_str(&row.payload)?,
            fetched_at: parse_timestamp(&row.fetched_at)?,
            expires_at: parse_timestamp(&row.expires_at)?,
            key: row.cache_key,
            source: row.source,
        })
    }
}
