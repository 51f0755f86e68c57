use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;

use cryptodash_market_data::{
    normalize_symbol, Candle, DataKind, Fetched, FundingRatePoint, Interval, LiquidationPoint,
    LongShortRatioPoint, MarketDataError, OpenInterestPoint, ProviderInfo, ProviderRegistry, Ticker,
};

use super::market_model::{clamp_limit, IndicatorReport};
use super::market_traits::MarketServiceTrait;
use crate::cache::{cache_key, CacheTtls, Cached, TtlCache};
use crate::errors::{Error, IndicatorError, Result};
use crate::indicators::{IndicatorSeries, TechnicalSnapshot};
use crate::signals::DerivativesContext;

/// Points fetched per series when building a derivatives context.
const CONTEXT_WINDOW: usize = 24;

pub struct MarketService {
    registry: Arc<ProviderRegistry>,
    cache: TtlCache,
    ttls: CacheTtls,
}

impl MarketService {
    pub fn new(registry: Arc<ProviderRegistry>, cache: TtlCache) -> Self {
        Self {
            registry,
            cache,
            ttls: CacheTtls::default(),
        }
    }

    pub fn with_ttls(mut self, ttls: CacheTtls) -> Self {
        self.ttls = ttls;
        self
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    async fn through_cache<T, F, Fut>(
        &self,
        kind: DataKind,
        symbol: &str,
        interval: Option<Interval>,
        limit: usize,
        fetch: F,
    ) -> Result<Cached<T>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Fetched<T>, MarketDataError>>,
    {
        let key = cache_key(kind, symbol, interval, limit);
        self.cache
            .get_or_fetch(&key, self.ttls.for_kind(kind), || async move {
                let fetched = fetch().await?;
                Ok::<_, Error>((fetched.data, fetched.provider.to_string()))
            })
            .await
    }
}

fn latest_funding(points: &[FundingRatePoint]) -> Option<f64> {
    points.last().map(|p| p.rate)
}

fn open_interest_change_pct(points: &[OpenInterestPoint]) -> Option<f64> {
    let first = points.first()?.open_interest_usd;
    let last = points.last()?.open_interest_usd;
    if points.len() < 2 || first <= 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

fn liquidation_imbalance(points: &[LiquidationPoint]) -> Option<f64> {
    let longs: f64 = points.iter().map(|p| p.long_usd).sum();
    let shorts: f64 = points.iter().map(|p| p.short_usd).sum();
    let total = longs + shorts;
    (total > 0.0).then(|| (longs - shorts) / total)
}

fn best_effort<T>(what: &str, result: Result<Cached<T>>) -> Option<T> {
    match result {
        Ok(cached) => Some(cached.data),
        Err(e) => {
            debug!("Derivatives context without {}: {}", what, e);
            None
        }
    }
}

#[async_trait]
impl MarketServiceTrait for MarketService {
    async fn candles(&self, symbol: &str, interval: Interval, limit: Option<usize>) -> Result<Cached<Vec<Candle>>> {
        let symbol = normalize_symbol(symbol)?;
        let limit = clamp_limit(limit);
        self.through_cache(DataKind::Candles, &symbol, Some(interval), limit, || {
            self.registry.fetch_candles(&symbol, interval, limit)
        })
        .await
    }

    async fn ticker(&self, symbol: &str) -> Result<Cached<Ticker>> {
        let symbol = normalize_symbol(symbol)?;
        self.through_cache(DataKind::Ticker, &symbol, None, 0, || {
            self.registry.fetch_ticker(&symbol)
        })
        .await
    }

    async fn funding_rates(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<FundingRatePoint>>> {
        let symbol = normalize_symbol(symbol)?;
        let limit = clamp_limit(limit);
        self.through_cache(DataKind::FundingRate, &symbol, Some(interval), limit, || {
            self.registry.fetch_funding_rates(&symbol, interval, limit)
        })
        .await
    }

    async fn open_interest(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<OpenInterestPoint>>> {
        let symbol = normalize_symbol(symbol)?;
        let limit = clamp_limit(limit);
        self.through_cache(DataKind::OpenInterest, &symbol, Some(interval), limit, || {
            self.registry.fetch_open_interest(&symbol, interval, limit)
        })
        .await
    }

    async fn liquidations(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<LiquidationPoint>>> {
        let symbol = normalize_symbol(symbol)?;
        let limit = clamp_limit(limit);
        self.through_cache(DataKind::Liquidations, &symbol, Some(interval), limit, || {
            self.registry.fetch_liquidations(&symbol, interval, limit)
        })
        .await
    }

    async fn long_short_ratio(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<Vec<LongShortRatioPoint>>> {
        let symbol = normalize_symbol(symbol)?;
        let limit = clamp_limit(limit);
        self.through_cache(DataKind::LongShortRatio, &symbol, Some(interval), limit, || {
            self.registry.fetch_long_short_ratio(&symbol, interval, limit)
        })
        .await
    }

    async fn indicators(
        &self,
        symbol: &str,
        interval: Interval,
        limit: Option<usize>,
    ) -> Result<Cached<IndicatorReport>> {
        let symbol = normalize_symbol(symbol)?;
        let candles = self.candles(&symbol, interval, limit).await?;

        let series = IndicatorSeries::compute(&candles.data)?;
        let snapshot = match TechnicalSnapshot::compute(&candles.data) {
            Ok(snapshot) => Some(snapshot),
            Err(IndicatorError::InsufficientData { required, available }) => {
                debug!(
                    "No snapshot for {} {}: {} of {} candles",
                    symbol, interval, available, required
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(candles.map(|candles| IndicatorReport {
            symbol,
            interval,
            candles,
            series,
            snapshot,
        }))
    }

    async fn derivatives_context(&self, symbol: &str, interval: Interval) -> DerivativesContext {
        let window = Some(CONTEXT_WINDOW);
        let (funding, open_interest, liquidations, ratio) = futures::join!(
            self.funding_rates(symbol, interval, window),
            self.open_interest(symbol, interval, window),
            self.liquidations(symbol, interval, window),
            self.long_short_ratio(symbol, interval, window),
        );

        DerivativesContext {
            funding_rate: best_effort("funding", funding).and_then(|p| latest_funding(&p)),
            open_interest_change_pct: best_effort("open interest", open_interest)
                .and_then(|p| open_interest_change_pct(&p)),
            long_short_ratio: best_effort("long/short ratio", ratio)
                .and_then(|p| p.last().map(|r| r.ratio)),
            liquidation_imbalance: best_effort("liquidations", liquidations)
                .and_then(|p| liquidation_imbalance(&p)),
        }
    }

    fn providers(&self) -> Vec<ProviderInfo> {
        self.registry.provider_infos()
    }

    async fn purge_cache(&self) -> Result<usize> {
        self.cache.purge_expired().await
    }
}
