//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider capabilities and rate limiting configuration
//! - Concrete providers: Kraken (candles, ticker), CoinMarketCap and Tatum
//!   (ticker), CoinGlass (derivatives metrics)
//!
//! Providers receive normalised base-asset symbols and translate them into
//! their own pair naming.

mod capabilities;
mod http;
mod traits;

pub mod coinglass;
pub mod coinmarketcap;
pub mod kraken;
pub mod tatum;

pub use capabilities::{ProviderCapabilities, RateLimit};
pub use http::de_opt_f64;
pub use traits::MarketDataProvider;
