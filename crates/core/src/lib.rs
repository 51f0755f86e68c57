//! Cryptodash Core - indicators, signal scoring, caching and market services.
//!
//! This crate is database-agnostic. It defines the storage traits
//! ([`cache::CacheStore`], [`signals::SignalRepositoryTrait`]) that the
//! `storage-sqlite` crate implements, and the [`signals::SignalAdvisor`]
//! seam the `ai` crate plugs into.

pub mod cache;
pub mod errors;
pub mod indicators;
pub mod market;
pub mod signals;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::Error;
pub use errors::Result;
