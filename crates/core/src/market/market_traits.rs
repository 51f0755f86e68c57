use async_trait::async_trait;

use cryptodash_market_data::{
    Candle, FundingRatePoint, Interval, LiquidationPoint, LongShortRatioPoint, OpenInterestPoint,
    ProviderInfo, Ticker,
};

use super::market_model::IndicatorReport;
use crate::cache::Cached;
use crate::errors::Result;
use crate::signals::DerivativesContext;

/// Cached market and derivatives reads.
///
/// `limit` of `None` means the default window; any value is clamped.
#[async_trait]
pub trait MarketServiceTrait: Send + Sync {
    async fn candles(&self, symbol: &str, interval: Interval, limit: Option<usize>) -> Result<Cached<Vec<Candle>>>;

    async fn ticker(&self, symbol: &str) -> Result<Cached<Ticker>>;

    async fn funding_rates(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<FundingRatePoint>>>;

    async fn open_interest(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<OpenInterestPoint>>>;

    async fn liquidations(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<LiquidationPoint>>>;

    async fn long_short_ratio(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<LongShortRatioPoint>>>;

    async fn indicators(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<IndicatorReport>>;

    /// Latest derivatives readings. Never fails; missing inputs are `None`.
    async fn derivatives_context(&self, symbol: &str, interval: Interval) -> DerivativesContext;

    fn providers(&self) -> Vec<ProviderInfo>;

    async fn purge_cache(&self) -> Result<usize>;
}
