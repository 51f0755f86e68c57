//! TTL cache for provider responses.

mod cache_model;
mod cache_service;
mod cache_traits;
mod memory_store;

pub use cache_model::{cache_key, CacheEntry, CacheStatus, CacheTtls, Cached};
pub use cache_service::{TtlCache, DEFAULT_STALE_GRACE};
pub use cache_traits::CacheStore;
pub use memory_store::MemoryCacheStore;
