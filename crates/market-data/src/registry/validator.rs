//! Sanity checks on provider payloads.
//!
//! Candle batches are repaired where possible: malformed bars are dropped
//! with a warning, the rest sorted by time with duplicate timestamps removed.
//! A batch that loses every bar is rejected. Tickers and metric points must
//! be finite and within range.

use log::warn;

use crate::errors::MarketDataError;
use crate::models::{
    Candle, FundingRatePoint, LiquidationPoint, LongShortRatioPoint, OpenInterestPoint, Ticker,
};

/// Payloads the registry knows how to validate.
pub trait Validate: Sized {
    fn validate(self) -> Result<Self, MarketDataError>;
}

fn fail(message: impl Into<String>) -> MarketDataError {
    MarketDataError::ValidationFailed {
        message: message.into(),
    }
}

/// Check one candle, returning the reason it is unusable.
pub fn check_candle(candle: &Candle) -> Result<(), String> {
    let prices = [candle.open, candle.high, candle.low, candle.close];
    if prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return Err("non-positive or non-finite price".to_string());
    }
    if !candle.volume.is_finite() || candle.volume < 0.0 {
        return Err(format!("invalid volume {}", candle.volume));
    }
    if candle.low > candle.open.min(candle.close) {
        return Err(format!("low {} above body", candle.low));
    }
    if candle.high < candle.open.max(candle.close) {
        return Err(format!("high {} below body", candle.high));
    }
    Ok(())
}

impl Validate for Vec<Candle> {
    fn validate(self) -> Result<Self, MarketDataError> {
        let original = self.len();
        let mut kept: Vec<Candle> = self
            .into_iter()
            .filter(|c| match check_candle(c) {
                Ok(()) => true,
                Err(reason) => {
                    warn!("Dropping candle at {}: {}", c.time, reason);
                    false
                }
            })
            .collect();

        if original > 0 && kept.is_empty() {
            return Err(fail(format!("all {} candles failed validation", original)));
        }

        kept.sort_by_key(|c| c.time);
        kept.dedup_by_key(|c| c.time);
        Ok(kept)
    }
}

impl Validate for Ticker {
    fn validate(self) -> Result<Self, MarketDataError> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(fail(format!("ticker price {} for {}", self.price, self.symbol)));
        }
        Ok(self)
    }
}

/// Filter a metric series, failing only if nothing survives.
fn validate_series<T>(
    points: Vec<T>,
    what: &str,
    check: impl Fn(&T) -> bool,
    time: impl Fn(&T) -> chrono::DateTime<chrono::Utc>,
) -> Result<Vec<T>, MarketDataError> {
    let original = points.len();
    let mut kept: Vec<T> = points
        .into_iter()
        .filter(|p| {
            let ok = check(p);
            if !ok {
                warn!("Dropping invalid {} point at {}", what, time(p));
            }
            ok
        })
        .collect();

    if original > 0 && kept.is_empty() {
        return Err(fail(format!("all {} {} points failed validation", original, what)));
    }

    kept.sort_by_key(|p| time(p));
    Ok(kept)
}

impl Validate for Vec<FundingRatePoint> {
    fn validate(self) -> Result<Self, MarketDataError> {
        validate_series(self, "funding", |p| p.rate.is_finite(), |p| p.time)
    }
}

impl Validate for Vec<OpenInterestPoint> {
    fn validate(self) -> Result<Self, MarketDataError> {
        validate_series(
            self,
            "open interest",
            |p| p.open_interest_usd.is_finite() && p.open_interest_usd >= 0.0,
            |p| p.time,
        )
    }
}

impl Validate for Vec<LiquidationPoint> {
    fn validate(self) -> Result<Self, MarketDataError> {
        validate_series(
            self,
            "liquidation",
            |p| {
                p.long_usd.is_finite()
                    && p.short_usd.is_finite()
                    && p.long_usd >= 0.0
                    && p.short_usd >= 0.0
            },
            |p| p.time,
        )
    }
}

impl Validate for Vec<LongShortRatioPoint> {
    fn validate(self) -> Result<Self, MarketDataError> {
        let pct = |v: f64| v.is_finite() && (0.0..=100.0).contains(&v);
        validate_series(
            self,
            "long/short",
            |p| pct(p.long_pct) && pct(p.short_pct) && p.ratio.is_finite() && p.ratio >= 0.0,
            |p| p.time,
        )
    }
}
