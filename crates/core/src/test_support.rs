//! Fakes shared by the service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use cryptodash_market_data::{
    Candle, DataKind, FundingRatePoint, Interval, LiquidationPoint, LongShortRatioPoint,
    MarketDataError, MarketDataProvider, OpenInterestPoint, ProviderCapabilities, RateLimit,
    Ticker,
};

pub fn bar_time(i: usize) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::hours(i as i64)
}

/// `n` hourly candles whose close moves by `step` per bar from `start`.
pub fn trending_candles(n: usize, start: f64, step: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = start + step * i as f64;
            let open = close - step;
            Candle::new(
                bar_time(i),
                open,
                open.max(close) + 1.0,
                open.min(close) - 1.0,
                close,
                10.0,
            )
        })
        .collect()
}

/// Serves canned candles and derivatives for any symbol.
pub struct FakeProvider {
    pub candles: Vec<Candle>,
    pub fail_derivatives: bool,
    calls: AtomicUsize,
}

impl FakeProvider {
    pub fn new(candles: Vec<Candle>) -> Arc<Self> {
        Arc::new(Self {
            candles,
            fail_derivatives: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn without_derivatives(candles: Vec<Candle>) -> Arc<Self> {
        Arc::new(Self {
            candles,
            fail_derivatives: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn derivatives_guard(&self) -> Result<(), MarketDataError> {
        self.hit();
        if self.fail_derivatives {
            return Err(MarketDataError::NoData {
                provider: "FAKE".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for FakeProvider {
    fn id(&self) -> &'static str {
        "FAKE"
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &DataKind::ALL,
            intervals: &Interval::ALL,
            requires_api_key: false,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60_000,
            burst: 1_000,
            min_delay: std::time::Duration::ZERO,
        }
    }

    async fn get_candles(
        &self,
        symbol: &str,
        _interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        self.hit();
        if symbol == "NOPE" {
            return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
        }
        let skip = self.candles.len().saturating_sub(limit);
        Ok(self.candles[skip..].to_vec())
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        self.hit();
        Ok(Ticker {
            symbol: symbol.to_string(),
            price: 100.0,
            change_24h_pct: Some(1.5),
            volume_24h: None,
            market_cap: None,
            time: bar_time(0),
            source: "FAKE".to_string(),
        })
    }

    async fn get_funding_rates(
        &self,
        _symbol: &str,
        _interval: Interval,
        _limit: usize,
    ) -> Result<Vec<FundingRatePoint>, MarketDataError> {
        self.derivatives_guard()?;
        Ok(vec![
            FundingRatePoint { time: bar_time(0), rate: 0.0001 },
            FundingRatePoint { time: bar_time(1), rate: 0.0008 },
        ])
    }

    async fn get_open_interest(
        &self,
        _symbol: &str,
        _interval: Interval,
        _limit: usize,
    ) -> Result<Vec<OpenInterestPoint>, MarketDataError> {
        self.derivatives_guard()?;
        Ok(vec![
            OpenInterestPoint { time: bar_time(0), open_interest_usd: 1_000.0 },
            OpenInterestPoint { time: bar_time(1), open_interest_usd: 1_100.0 },
        ])
    }

    async fn get_liquidations(
        &self,
        _symbol: &str,
        _interval: Interval,
        _limit: usize,
    ) -> Result<Vec<LiquidationPoint>, MarketDataError> {
        self.derivatives_guard()?;
        Ok(vec![
            LiquidationPoint { time: bar_time(0), long_usd: 300.0, short_usd: 100.0 },
            LiquidationPoint { time: bar_time(1), long_usd: 100.0, short_usd: 100.0 },
        ])
    }

    async fn get_long_short_ratio(
        &self,
        _symbol: &str,
        _interval: Interval,
        _limit: usize,
    ) -> Result<Vec<LongShortRatioPoint>, MarketDataError> {
        self.derivatives_guard()?;
        Ok(vec![LongShortRatioPoint {
            time: bar_time(0),
            long_pct: 70.0,
            short_pct: 30.0,
            ratio: 70.0 / 30.0,
        }])
    }
}
