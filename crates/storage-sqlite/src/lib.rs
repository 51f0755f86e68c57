//! SQLite storage for the crypto dashboard.
//!
//! Implements the storage traits from `cryptodash-core` with Diesel:
//! - connection pooling, pragmas and embedded migrations
//! - a single writer task that serialises all writes
//! - [`SqliteCacheRepository`] for the `api_cache` table
//! - [`SignalRepository`] for the `trade_signals` table
//!
//! ```text
//! core (traits) ──► storage-sqlite (this crate) ──► SQLite DB
//! ```

pub mod cache;
pub mod db;
pub mod errors;
pub mod schema;
pub mod signals;
mod utils;

pub use cache::SqliteCacheRepository;
pub use db::{create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle};
pub use errors::{IntoCore, StorageError};
pub use signals::SignalRepository;

pub use cryptodash_core::errors::{DatabaseError, Error, Result};
