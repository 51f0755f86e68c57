//! Cryptodash Market Data Crate
//!
//! Provider-agnostic fetching of crypto spot and derivatives data.
//!
//! # Overview
//!
//! - Spot candles and tickers (Kraken, CoinMarketCap, Tatum)
//! - Perpetual-futures metrics: funding rate, open interest, liquidations,
//!   long/short ratio (CoinGlass)
//! - Per-provider rate limiting, retry with backoff and circuit breaking
//! - Payload validation before anything reaches callers
//!
//! # Architecture
//!
//! ```text
//! caller --"btc/usd"--> normalize_symbol --"BTC"--> ProviderRegistry
//!                                                      |
//!                       +------------------------------+
//!                       v
//!    for each capable provider, by priority:
//!      circuit open? -> skip
//!      rate limiter  -> wait for token
//!      provider call -> retry_with_backoff on transient errors
//!      validate      -> Fetched { data, provider }
//! ```

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;

pub use errors::{MarketDataError, RetryClass};

pub use models::{
    closes, normalize_symbol, Candle, DataKind, FundingRatePoint, Interval, LiquidationPoint,
    LongShortRatioPoint, OpenInterestPoint, ProviderId, Ticker,
};

pub use provider::coinglass::CoinGlassProvider;
pub use provider::coinmarketcap::CoinMarketCapProvider;
pub use provider::kraken::KrakenProvider;
pub use provider::tatum::TatumProvider;
pub use provider::{de_opt_f64, MarketDataProvider, ProviderCapabilities, RateLimit};

pub use registry::{
    BackoffPolicy, CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState, Fetched,
    ProviderInfo, ProviderRegistry, RateLimiter,
};
