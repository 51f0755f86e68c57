use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use cryptodash_market_data::Interval;

use crate::errors::ValidationError;
use crate::indicators::TechnicalSnapshot;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
    Neutral,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
            Direction::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" | "BUY" => Ok(Direction::Long),
            "SHORT" | "SELL" => Ok(Direction::Short),
            "NEUTRAL" | "HOLD" | "FLAT" => Ok(Direction::Neutral),
            other => Err(ValidationError::InvalidInput(format!("unknown direction '{}'", other))),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalSource {
    Technical,
    Ai,
}

impl SignalSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalSource::Technical => "TECHNICAL",
            SignalSource::Ai => "AI",
        }
    }
}

impl FromStr for SignalSource {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TECHNICAL" => Ok(SignalSource::Technical),
            "AI" => Ok(SignalSource::Ai),
            other => Err(ValidationError::InvalidInput(format!("unknown signal source '{}'", other))),
        }
    }
}

/// Derivatives sentiment at signal time. Each field is best effort.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivativesContext {
    /// Latest funding rate as a fraction (`0.0001` = 0.01%).
    pub funding_rate: Option<f64>,
    /// Percent change of open interest across the fetched window.
    pub open_interest_change_pct: Option<f64>,
    pub long_short_ratio: Option<f64>,
    /// `(long - short) / (long + short)` liquidated notional, in `[-1, 1]`.
    /// Positive means longs were liquidated more.
    pub liquidation_imbalance: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalScore {
    /// In `[-100, 100]`; positive is bullish.
    pub score: f64,
    pub direction: Direction,
    /// In `[0, 100]`.
    pub confidence: u8,
    pub reasons: Vec<String>,
}

/// Entry, stop and target prices for a directional signal.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalLevels {
    pub entry: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

impl SignalLevels {
    /// Long: stop < entry < target. Short: target < entry < stop.
    /// Neutral signals must carry no levels.
    pub fn is_consistent(&self, direction: Direction) -> bool {
        match (direction, self.stop_loss, self.take_profit) {
            (Direction::Neutral, None, None) => true,
            (Direction::Neutral, _, _) => false,
            (Direction::Long, Some(stop), Some(target)) => stop < self.entry && self.entry < target,
            (Direction::Short, Some(stop), Some(target)) => target < self.entry && self.entry < stop,
            _ => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSignal {
    pub id: String,
    pub symbol: String,
    pub interval: Interval,
    pub direction: Direction,
    pub confidence: u8,
    pub score: f64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub rationale: String,
    pub source: SignalSource,
    /// The technical snapshot and derivatives context the signal was based on.
    pub indicators: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl TradeSignal {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Signals stay valid for four bars, and never less than an hour.
pub fn signal_expiry(created_at: DateTime<Utc>, interval: Interval) -> DateTime<Utc> {
    let horizon = (interval.duration() * 4).max(Duration::hours(1));
    created_at + horizon
}

/// Everything an advisor sees when asked for an opinion.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorRequest {
    pub symbol: String,
    pub interval: Interval,
    pub snapshot: TechnicalSnapshot,
    pub derivatives: DerivativesContext,
    pub technical: SignalScore,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisorOpinion {
    pub direction: Direction,
    pub confidence: u8,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub rationale: String,
}
