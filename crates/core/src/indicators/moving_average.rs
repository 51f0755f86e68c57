//! Simple and exponential moving averages.

use super::Series;
use crate::errors::IndicatorError;

pub(crate) fn check_period(name: &'static str, period: usize) -> Result<(), IndicatorError> {
    if period == 0 {
        return Err(IndicatorError::InvalidPeriod {
            name,
            detail: "period must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Simple moving average. The first `period - 1` points are `None`.
pub fn sma(values: &[f64], period: usize) -> Result<Series, IndicatorError> {
    check_period("SMA", period)?;

    let mut out = vec![None; values.len()];
    let mut sum = 0.0;
    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }
        if i + 1 >= period {
            out[i] = Some(sum / period as f64);
        }
    }
    Ok(out)
}

/// Exponential moving average with `α = 2 / (period + 1)`, seeded with the
/// SMA of the first `period` values.
pub fn ema(values: &[f64], period: usize) -> Result<Series, IndicatorError> {
    check_period("EMA", period)?;

    let mut out = vec![None; values.len()];
    if values.len() < period {
        return Ok(out);
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(current);

    for (i, value) in values.iter().enumerate().skip(period) {
        current = alpha * value + (1.0 - alpha) * current;
        out[i] = Some(current);
    }
    Ok(out)
}

/// EMA over only the defined points of `series`, re-aligned to its indices.
pub(crate) fn ema_of_defined(series: &[Option<f64>], period: usize) -> Result<Series, IndicatorError> {
    let (indices, values): (Vec<usize>, Vec<f64>) = series
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .unzip();

    let smoothed = ema(&values, period)?;
    let mut out = vec![None; series.len()];
    for (idx, value) in indices.into_iter().zip(smoothed) {
        out[idx] = value;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn approx(a: Option<f64>, b: f64) -> bool {
        a.map(|a| (a - b).abs() < 1e-9).unwrap_or(false)
    }

    #[test]
    fn test_sma_basic() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(approx(out[2], 2.0));
        assert!(approx(out[4], 4.0));
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let out = ema(&[2.0, 4.0, 6.0, 8.0], 3).unwrap();
        assert_eq!(out[1], None);
        assert!(approx(out[2], 4.0));
        // alpha = 0.5: 0.5 * 8 + 0.5 * 4
        assert!(approx(out[3], 6.0));
    }

    #[test]
    fn test_short_input_is_all_none() {
        assert!(ema(&[1.0, 2.0], 5).unwrap().iter().all(Option::is_none));
        assert!(sma(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(matches!(
            sma(&[1.0], 0),
            Err(IndicatorError::InvalidPeriod { name: "SMA", .. })
        ));
        assert!(ema(&[1.0], 0).is_err());
    }

    #[test]
    fn test_ema_of_defined_skips_gaps() {
        let series = vec![None, None, Some(2.0), Some(4.0), Some(6.0)];
        let out = ema_of_defined(&series, 2).unwrap();
        assert_eq!(out[2], None);
        assert!(approx(out[3], 3.0));
        assert_eq!(out.len(), 5);
    }

    proptest! {
        #[test]
        fn sma_stays_within_window_range(
            values in prop::collection::vec(1.0f64..1000.0, 1..120),
            period in 1usize..30,
        ) {
            let out = sma(&values, period).unwrap();
            prop_assert_eq!(out.len(), values.len());
            for (i, v) in out.iter().enumerate() {
                if let Some(v) = v {
                    let window = &values[i + 1 - period..=i];
                    let lo = window.iter().cloned().fold(f64::INFINITY, f64::min);
                    let hi = window.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                    prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
                }
            }
        }

        #[test]
        fn ema_stays_within_input_range(
            values in prop::collection::vec(1.0f64..1000.0, 1..120),
            period in 1usize..30,
        ) {
            let out = ema(&values, period).unwrap();
            let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            for v in out.into_iter().flatten() {
                prop_assert!(v >= lo - 1e-9 && v <= hi + 1e-9);
            }
        }
    }
}
