use serde::Serialize;

use cryptodash_market_data::{closes, Candle};

use super::{ema, ichimoku, macd, rsi, Ichimoku, IchimokuParams, Macd, MacdParams, Series};
use crate::errors::IndicatorError;

/// The full chart overlay set for a candle series.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSeries {
    pub ema20: Series,
    pub ema50: Series,
    pub rsi14: Series,
    pub macd: Macd,
    pub ichimoku: Ichimoku,
}

impl IndicatorSeries {
    pub fn compute(candles: &[Candle]) -> Result<Self, IndicatorError> {
        let closes = closes(candles);
        Ok(Self {
            ema20: ema(&closes, 20)?,
            ema50: ema(&closes, 50)?,
            rsi14: rsi(&closes, 14)?,
            macd: macd(&closes, MacdParams::default())?,
            ichimoku: ichimoku(candles, IchimokuParams::default())?,
        })
    }
}
