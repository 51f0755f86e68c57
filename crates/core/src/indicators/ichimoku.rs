//! Ichimoku Kinko Hyo.

use serde::Serialize;

use cryptodash_market_data::Candle;

use super::moving_average::check_period;
use super::Series;
use crate::errors::IndicatorError;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct IchimokuParams {
    pub tenkan: usize,
    pub kijun: usize,
    pub senkou_b: usize,
    pub displacement: usize,
}

impl Default for IchimokuParams {
    fn default() -> Self {
        Self {
            tenkan: 9,
            kijun: 26,
            senkou_b: 52,
            displacement: 26,
        }
    }
}

/// Ichimoku lines aligned to the input candles.
///
/// `senkou_a` and `senkou_b` are projected `displacement` bars forward, so
/// they are `displacement` points longer than the input. `chikou` is the
/// close plotted `displacement` bars back.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ichimoku {
    pub tenkan: Series,
    pub kijun: Series,
    pub senkou_a: Series,
    pub senkou_b: Series,
    pub chikou: Series,
}

/// Where price sits relative to the cloud.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudPosition {
    Above,
    Inside,
    Below,
}

impl CloudPosition {
    pub fn of(price: f64, senkou_a: f64, senkou_b: f64) -> Self {
        let top = senkou_a.max(senkou_b);
        let bottom = senkou_a.min(senkou_b);
        if price > top {
            CloudPosition::Above
        } else if price < bottom {
            CloudPosition::Below
        } else {
            CloudPosition::Inside
        }
    }
}

/// `(highest high + lowest low) / 2` over the trailing window ending at each bar.
fn midpoint(candles: &[Candle], period: usize) -> Series {
    (0..candles.len())
        .map(|i| {
            if i + 1 < period {
                return None;
            }
            let window = &candles[i + 1 - period..=i];
            let high = window.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            let low = window.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            Some((high + low) / 2.0)
        })
        .collect()
}

pub fn ichimoku(candles: &[Candle], params: IchimokuParams) -> Result<Ichimoku, IndicatorError> {
    check_period("Ichimoku tenkan", params.tenkan)?;
    check_period("Ichimoku kijun", params.kijun)?;
    check_period("Ichimoku senkou B", params.senkou_b)?;

    let n = candles.len();
    let d = params.displacement;

    let tenkan = midpoint(candles, params.tenkan);
    let kijun = midpoint(candles, params.kijun);
    let span_b = midpoint(candles, params.senkou_b);

    let mut senkou_a = vec![None; n + d];
    let mut senkou_b = vec![None; n + d];
    for i in 0..n {
        senkou_a[i + d] = match (tenkan[i], kijun[i]) {
            (Some(t), Some(k)) => Some((t + k) / 2.0),
            _ => None,
        };
        senkou_b[i + d] = span_b[i];
    }

    let chikou = (0..n)
        .map(|i| candles.get(i + d).map(|c| c.close))
        .collect();

    Ok(Ichimoku {
        tenkan,
        kijun,
        senkou_a,
        senkou_b,
        chikou,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn candles(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                Candle::new(
                    Utc.timestamp_opt(i as i64 * 3600, 0).unwrap(),
                    base,
                    base + 2.0,
                    base - 2.0,
                    base + 1.0,
                    10.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_lengths_and_displacement() {
        let data = candles(80);
        let out = ichimoku(&data, IchimokuParams::default()).unwrap();

        assert_eq!(out.tenkan.len(), 80);
        assert_eq!(out.senkou_a.len(), 106);
        assert_eq!(out.senkou_b.len(), 106);
        assert!(out.tenkan[7].is_none());
        assert!(out.tenkan[8].is_some());
        // Span A is first defined where kijun is, shifted forward 26.
        assert!(out.senkou_a[25 + 26].is_some());
        assert!(out.senkou_a[24 + 26].is_none());
        assert!(out.senkou_b[51 + 26].is_some());
    }

    #[test]
    fn test_tenkan_value() {
        let data = candles(20);
        let out = ichimoku(&data, IchimokuParams::default()).unwrap();
        // Bars 11..=19: highest high 121, lowest low 109.
        assert_eq!(out.tenkan[19], Some(115.0));
    }

    #[test]
    fn test_chikou_is_future_close() {
        let data = candles(30);
        let out = ichimoku(&data, IchimokuParams::default()).unwrap();
        assert_eq!(out.chikou[0], Some(data[26].close));
        assert_eq!(out.chikou[4], None);
    }

    #[test]
    fn test_cloud_position() {
        assert_eq!(CloudPosition::of(10.0, 8.0, 9.0), CloudPosition::Above);
        assert_eq!(CloudPosition::of(8.5, 8.0, 9.0), CloudPosition::Inside);
        assert_eq!(CloudPosition::of(7.0, 9.0, 8.0), CloudPosition::Below);
    }
}
