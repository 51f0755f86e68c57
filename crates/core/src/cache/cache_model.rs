use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cryptodash_market_data::{DataKind, Interval};

/// One cached provider response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub payload: serde_json::Value,
    /// Provider id that produced the payload.
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CacheStatus {
    Hit,
    Miss,
    /// Upstream failed; an expired entry was served instead.
    Stale,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value plus where it came from and how fresh it is.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cached<T> {
    pub data: T,
    #[serde(rename = "cache")]
    pub status: CacheStatus,
    pub source: String,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Cached<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Cached<U> {
        Cached {
            data: f(self.data),
            status: self.status,
            source: self.source,
            fetched_at: self.fetched_at,
        }
    }
}

/// Time-to-live per data kind.
#[derive(Clone, Debug)]
pub struct CacheTtls {
    pub ticker: Duration,
    pub candles: Duration,
    pub funding_rate: Duration,
    pub open_interest: Duration,
    pub liquidations: Duration,
    pub long_short_ratio: Duration,
    pub analysis: Duration,
}

impl Default for CacheTtls {
    fn default() -> Self {
        Self {
            ticker: Duration::from_secs(30),
            candles: Duration::from_secs(60),
            funding_rate: Duration::from_secs(300),
            open_interest: Duration::from_secs(300),
            liquidations: Duration::from_secs(300),
            long_short_ratio: Duration::from_secs(300),
            analysis: Duration::from_secs(600),
        }
    }
}

impl CacheTtls {
    pub fn for_kind(&self, kind: DataKind) -> Duration {
        match kind {
            DataKind::Candles => self.candles,
            DataKind::Ticker => self.ticker,
            DataKind::FundingRate => self.funding_rate,
            DataKind::OpenInterest => self.open_interest,
            DataKind::Liquidations => self.liquidations,
            DataKind::LongShortRatio => self.long_short_ratio,
        }
    }
}

/// `"<kind>:<SYMBOL>:<interval>:<limit>"`. Tickers use `-` for the
/// interval and `0` for the limit.
pub fn cache_key(kind: DataKind, symbol: &str, interval: Option<Interval>, limit: usize) -> String {
    format!(
        "{}:{}:{}:{}",
        kind,
        symbol.to_uppercase(),
        interval.map(|i| i.as_str()).unwrap_or("-"),
        limit
    )
}
