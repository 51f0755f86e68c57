//! The trait every market data source implements.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{
    Candle, FundingRatePoint, Interval, LiquidationPoint, LongShortRatioPoint, OpenInterestPoint,
    Ticker,
};

use super::capabilities::{ProviderCapabilities, RateLimit};

/// Trait for market data providers.
///
/// Symbols passed in are already normalised base assets (`"BTC"`); each
/// provider maps them to its own pair naming. Series are returned oldest
/// first and hold at most `limit` points.
///
/// Every data method has a default that returns `NotSupported`, so a provider
/// only implements what its capabilities advertise.
///
/// # Example
///
/// ```ignore
/// struct PriceOnly;
///
/// #[async_trait]
/// impl MarketDataProvider for PriceOnly {
///     fn id(&self) -> &'static str { "PRICE_ONLY" }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             data_kinds: &[DataKind::Ticker],
///             intervals: &[],
///             requires_api_key: false,
///         }
///     }
///
///     fn rate_limit(&self) -> RateLimit { RateLimit::default() }
///
///     async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> { ... }
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier, e.g. `"KRAKEN"`. Used for logging, circuit breaker
    /// tracking and the `source` field of responses.
    fn id(&self) -> &'static str;

    /// Lower values are tried first. Default is 10.
    fn priority(&self) -> u8 {
        10
    }

    fn capabilities(&self) -> ProviderCapabilities;

    fn rate_limit(&self) -> RateLimit;

    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let _ = (symbol, interval, limit);
        Err(self.not_supported("candles"))
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        let _ = symbol;
        Err(self.not_supported("ticker"))
    }

    async fn get_funding_rates(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<FundingRatePoint>, MarketDataError> {
        let _ = (symbol, interval, limit);
        Err(self.not_supported("funding_rate"))
    }

    async fn get_open_interest(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<OpenInterestPoint>, MarketDataError> {
        let _ = (symbol, interval, limit);
        Err(self.not_supported("open_interest"))
    }

    async fn get_liquidations(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<LiquidationPoint>, MarketDataError> {
        let _ = (symbol, interval, limit);
        Err(self.not_supported("liquidations"))
    }

    async fn get_long_short_ratio(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<LongShortRatioPoint>, MarketDataError> {
        let _ = (symbol, interval, limit);
        Err(self.not_supported("long_short_ratio"))
    }

    #[doc(hidden)]
    fn not_supported(&self, operation: &str) -> MarketDataError {
        MarketDataError::NotSupported {
            operation: operation.to_string(),
            provider: self.id().to_string(),
        }
    }
}
