//! Relative Strength Index with Wilder smoothing.

use super::moving_average::check_period;
use super::Series;
use crate::errors::IndicatorError;

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// RSI over `values`. The first defined point is at index `period`.
///
/// A window with no losses reads 100; a perfectly flat window reads 50.
pub fn rsi(values: &[f64], period: usize) -> Result<Series, IndicatorError> {
    check_period("RSI", period)?;

    let mut out = vec![None; values.len()];
    if values.len() <= period {
        return Ok(out);
    }

    let p = period as f64;
    let (mut avg_gain, mut avg_loss) = values[..=period]
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold((0.0, 0.0), |(g, l), change| {
            (g + change.max(0.0), l + (-change).max(0.0))
        });
    avg_gain /= p;
    avg_loss /= p;
    out[period] = Some(rsi_value(avg_gain, avg_loss));

    for i in (period + 1)..values.len() {
        let change = values[i] - values[i - 1];
        avg_gain = (avg_gain * (p - 1.0) + change.max(0.0)) / p;
        avg_loss = (avg_loss * (p - 1.0) + (-change).max(0.0)) / p;
        out[i] = Some(rsi_value(avg_gain, avg_loss));
    }
    Ok(out)
}
