//! Latest-bar summary of every indicator, the input to signal scoring.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cryptodash_market_data::{closes, Candle};

use super::{
    detect_divergence, ema, ichimoku, macd, rsi, CloudPosition, Divergence, IchimokuParams,
    MacdParams, PivotPoints,
};
use crate::errors::IndicatorError;

/// Candles needed for a snapshot: one full Ichimoku senkou B window.
pub const MIN_SNAPSHOT_CANDLES: usize = 52;

const DIVERGENCE_LOOKBACK: usize = 30;
const SWING_WINDOW: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MacdPoint {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IchimokuPoint {
    pub tenkan: Option<f64>,
    pub kijun: Option<f64>,
    pub senkou_a: Option<f64>,
    pub senkou_b: Option<f64>,
    /// `None` until both spans are defined at the latest bar.
    pub cloud: Option<CloudPosition>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalSnapshot {
    pub time: DateTime<Utc>,
    pub close: f64,
    pub ema20: Option<f64>,
    pub ema50: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd: Option<MacdPoint>,
    pub ichimoku: IchimokuPoint,
    /// Levels from the previous candle, i.e. in force for the latest one.
    pub pivots: PivotPoints,
    pub divergence: Divergence,
}

impl TechnicalSnapshot {
    /// Summarise the latest bar of `candles` (oldest first).
    pub fn compute(candles: &[Candle]) -> Result<Self, IndicatorError> {
        if candles.len() < MIN_SNAPSHOT_CANDLES {
            return Err(IndicatorError::InsufficientData {
                required: MIN_SNAPSHOT_CANDLES,
                available: candles.len(),
            });
        }

        let closes = closes(candles);
        let last = candles.len() - 1;
        let latest = &candles[last];
        let previous = &candles[last - 1];

        let ema20 = ema(&closes, 20)?;
        let ema50 = ema(&closes, 50)?;
        let rsi14 = rsi(&closes, 14)?;
        let macd_series = macd(&closes, MacdParams::default())?;
        let cloud = ichimoku(candles, IchimokuParams::default())?;

        let macd = match (
            macd_series.macd[last],
            macd_series.signal[last],
            macd_series.histogram[last],
        ) {
            (Some(macd), Some(signal), Some(histogram)) => Some(MacdPoint {
                macd,
                signal,
                histogram,
            }),
            _ => None,
        };

        let senkou_a = cloud.senkou_a[last];
        let senkou_b = cloud.senkou_b[last];
        let ichimoku = IchimokuPoint {
            tenkan: cloud.tenkan[last],
            kijun: cloud.kijun[last],
            senkou_a,
            senkou_b,
            cloud: match (senkou_a, senkou_b) {
                (Some(a), Some(b)) => Some(CloudPosition::of(latest.close, a, b)),
                _ => None,
            },
        };

        let divergence = detect_divergence(&closes, &rsi14, DIVERGENCE_LOOKBACK, SWING_WINDOW)?;

        Ok(Self {
            time: latest.time,
            close: latest.close,
            ema20: ema20[last],
            ema50: ema50[last],
            rsi14: rsi14[last],
            macd,
            ichimoku,
            pivots: PivotPoints::classic(previous.high, previous.low, previous.close),
            divergence,
        })
    }
}
