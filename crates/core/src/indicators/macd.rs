//! Moving Average Convergence Divergence.

use serde::Serialize;

use super::moving_average::{check_period, ema, ema_of_defined};
use super::Series;
use crate::errors::IndicatorError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MacdParams {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal: 9,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Macd {
    pub macd: Series,
    pub signal: Series,
    pub histogram: Series,
}

/// MACD line (fast EMA minus slow EMA), its signal EMA, and the histogram.
///
/// The signal EMA runs over the defined MACD points only, so its first value
/// lands at index `slow + signal - 2`.
pub fn macd(values: &[f64], params: MacdParams) -> Result<Macd, IndicatorError> {
    check_period("MACD fast", params.fast)?;
    check_period("MACD signal", params.signal)?;
    if params.slow <= params.fast {
        return Err(IndicatorError::InvalidPeriod {
            name: "MACD",
            detail: format!("slow ({}) must exceed fast ({})", params.slow, params.fast),
        });
    }

    let fast = ema(values, params.fast)?;
    let slow = ema(values, params.slow)?;

    let line: Series = fast
        .iter()
        .zip(&slow)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_of_defined(&line, params.signal)?;
    let histogram = line
        .iter()
        .zip(&signal)
        .map(|(m, s)| Some((*m)? - (*s)?))
        .collect();

    Ok(Macd {
        macd: line,
        signal,
        histogram,
    })
}
