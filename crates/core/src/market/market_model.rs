use serde::Serialize;

use cryptodash_market_data::{Candle, Interval};

use crate::indicators::{IndicatorSeries, TechnicalSnapshot};

pub const DEFAULT_LIMIT: usize = 200;
pub const MAX_LIMIT: usize = 1000;

/// Clamp a requested row count into `[1, MAX_LIMIT]`.
pub fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Chart overlays for a candle window.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorReport {
    pub symbol: String,
    pub interval: Interval,
    pub candles: Vec<Candle>,
    pub series: IndicatorSeries,
    /// Absent when the window is too short for a full snapshot.
    pub snapshot: Option<TechnicalSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), 200);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(50)), 50);
        assert_eq!(clamp_limit(Some(5000)), 1000);
    }
}
