//! Perpetual-futures metrics series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Funding rate at the close of a bar, as a fraction (`0.0001` = 0.01%).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingRatePoint {
    pub time: DateTime<Utc>,
    pub rate: f64,
}

/// Aggregated open interest in USD at the close of a bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInterestPoint {
    pub time: DateTime<Utc>,
    pub open_interest_usd: f64,
}

/// Liquidated notional per side over one bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidationPoint {
    pub time: DateTime<Utc>,
    pub long_usd: f64,
    pub short_usd: f64,
}

impl LiquidationPoint {
    pub fn total_usd(&self) -> f64 {
        self.long_usd + self.short_usd
    }
}

/// Share of accounts positioned long vs short.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LongShortRatioPoint {
    pub time: DateTime<Utc>,
    /// Percent in `[0, 100]`.
    pub long_pct: f64,
    /// Percent in `[0, 100]`.
    pub short_pct: f64,
    pub ratio: f64,
}
