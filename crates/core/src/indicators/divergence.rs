//! Swing detection and price/oscillator divergence.

use serde::Serialize;

use crate::errors::IndicatorError;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingKind {
    High,
    Low,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Swing {
    pub index: usize,
    pub value: f64,
    pub kind: SwingKind,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceKind {
    /// Price lower low, oscillator higher low.
    Bullish,
    /// Price higher high, oscillator lower high.
    Bearish,
    /// Price higher low, oscillator lower low.
    HiddenBullish,
    /// Price lower high, oscillator higher high.
    HiddenBearish,
    None,
}

impl DivergenceKind {
    /// `+1` for bullish kinds, `-1` for bearish, `0` otherwise.
    pub fn bias(&self) -> f64 {
        match self {
            DivergenceKind::Bullish | DivergenceKind::HiddenBullish => 1.0,
            DivergenceKind::Bearish | DivergenceKind::HiddenBearish => -1.0,
            DivergenceKind::None => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Divergence {
    pub kind: DivergenceKind,
    /// In `[0, 1]`: oscillator disagreement relative to its range over the lookback.
    pub strength: f64,
    /// The two price swings compared, oldest first.
    pub swings: Option<(usize, usize)>,
}

impl Divergence {
    pub fn none() -> Self {
        Self {
            kind: DivergenceKind::None,
            strength: 0.0,
            swings: None,
        }
    }
}

/// Local extrema: a bar is a swing high if it beats every bar within
/// `window` on each side (ties only to the right). Bars without a full
/// window on both sides are never swings.
pub fn find_swings(values: &[f64], window: usize) -> Vec<Swing> {
    if window == 0 || values.len() < 2 * window + 1 {
        return Vec::new();
    }

    let mut swings = Vec::new();
    for i in window..values.len() - window {
        let v = values[i];
        let left = &values[i - window..i];
        let right = &values[i + 1..=i + window];

        if left.iter().all(|x| *x < v) && right.iter().all(|x| *x <= v) {
            swings.push(Swing {
                index: i,
                value: v,
                kind: SwingKind::High,
            });
        } else if left.iter().all(|x| *x > v) && right.iter().all(|x| *x >= v) {
            swings.push(Swing {
                index: i,
                value: v,
                kind: SwingKind::Low,
            });
        }
    }
    swings
}

/// Compare the last two price swings of each kind within the trailing
/// `lookback` bars against the oscillator at the same bars.
///
/// When several divergences are present the one ending most recently wins;
/// regular beats hidden on a tie.
pub fn detect_divergence(
    closes: &[f64],
    oscillator: &[Option<f64>],
    lookback: usize,
    window: usize,
) -> Result<Divergence, IndicatorError> {
    if window == 0 || lookback < 2 * window + 2 {
        return Err(IndicatorError::InvalidPeriod {
            name: "divergence",
            detail: format!("lookback {} too short for window {}", lookback, window),
        });
    }
    if closes.len() != oscillator.len() {
        return Err(IndicatorError::InsufficientData {
            required: closes.len(),
            available: oscillator.len(),
        });
    }

    let start = closes.len().saturating_sub(lookback);
    let osc_window: Vec<f64> = oscillator[start..].iter().flatten().copied().collect();
    let osc_range = {
        let hi = osc_window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let lo = osc_window.iter().copied().fold(f64::INFINITY, f64::min);
        hi - lo
    };
    if osc_window.len() < 2 || osc_range <= 0.0 {
        return Ok(Divergence::none());
    }

    let swings: Vec<Swing> = find_swings(&closes[start..], window)
        .into_iter()
        .map(|s| Swing {
            index: s.index + start,
            ..s
        })
        .filter(|s| oscillator[s.index].is_some())
        .collect();

    let mut best: Option<(usize, Divergence)> = None;

    for kind in [SwingKind::Low, SwingKind::High] {
        let mut of_kind = swings.iter().filter(|s| s.kind == kind).rev();
        let (Some(b), Some(a)) = (of_kind.next(), of_kind.next()) else {
            continue;
        };
        let (Some(osc_a), Some(osc_b)) = (oscillator[a.index], oscillator[b.index]) else {
            continue;
        };

        let price_up = b.value > a.value;
        let price_down = b.value < a.value;
        let osc_up = osc_b > osc_a;
        let osc_down = osc_b < osc_a;

        let found = match kind {
            SwingKind::Low if price_down && osc_up => DivergenceKind::Bullish,
            SwingKind::Low if price_up && osc_down => DivergenceKind::HiddenBullish,
            SwingKind::High if price_up && osc_down => DivergenceKind::Bearish,
            SwingKind::High if price_down && osc_up => DivergenceKind::HiddenBearish,
            _ => continue,
        };

        let candidate = Divergence {
            kind: found,
            strength: ((osc_b - osc_a).abs() / osc_range).clamp(0.0, 1.0),
            swings: Some((a.index, b.index)),
        };

        let regular = matches!(found, DivergenceKind::Bullish | DivergenceKind::Bearish);
        let replace = match &best {
            None => true,
            Some((idx, current)) => {
                b.index > *idx
                    || (b.index == *idx
                        && regular
                        && !matches!(current.kind, DivergenceKind::Bullish | DivergenceKind::Bearish))
            }
        };
        if replace {
            best = Some((b.index, candidate));
        }
    }

    Ok(best.map(|(_, d)| d).unwrap_or_else(Divergence::none))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_swings() {
        let values = [1.0, 3.0, 5.0, 3.0, 1.0, 0.5, 1.0, 2.0];
        let swings = find_swings(&values, 2);
        assert_eq!(swings.len(), 2);
        assert_eq!(swings[0].index, 2);
        assert_eq!(swings[0].kind, SwingKind::High);
        assert_eq!(swings[1].index, 5);
        assert_eq!(swings[1].kind, SwingKind::Low);
    }

    #[test]
    fn test_swings_need_full_window() {
        assert!(find_swings(&[1.0, 0.0, 1.0], 2).is_empty());
        assert!(find_swings(&[1.0, 2.0, 3.0], 0).is_empty());
    }

    #[test]
    fn test_bullish_divergence() {
        // Price makes a lower low at index 8, oscillator a higher low.
        let closes = [10.0, 9.0, 8.0, 9.0, 10.0, 9.5, 9.0, 8.0, 7.5, 8.5, 9.5];
        let osc: Vec<Option<f64>> = [50.0, 40.0, 30.0, 40.0, 50.0, 48.0, 45.0, 40.0, 38.0, 45.0, 50.0]
            .iter()
            .map(|v| Some(*v))
            .collect();

        let div = detect_divergence(&closes, &osc, 11, 2).unwrap();
        assert_eq!(div.kind, DivergenceKind::Bullish);
        assert_eq!(div.swings, Some((2, 8)));
        assert!((div.strength - 8.0 / 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_bearish_divergence() {
        let closes = [1.0, 2.0, 3.0, 2.0, 1.0, 1.5, 2.0, 3.0, 3.5, 2.5, 1.5];
        let osc: Vec<Option<f64>> = [50.0, 60.0, 70.0, 60.0, 50.0, 52.0, 55.0, 60.0, 62.0, 55.0, 50.0]
            .iter()
            .map(|v| Some(*v))
            .collect();

        let div = detect_divergence(&closes, &osc, 11, 2).unwrap();
        assert_eq!(div.kind, DivergenceKind::Bearish);
        assert!(div.strength > 0.0 && div.strength <= 1.0);
    }

    #[test]
    fn test_agreeing_swings_are_not_divergent() {
        let closes = [10.0, 9.0, 8.0, 9.0, 10.0, 9.5, 9.0, 8.0, 7.5, 8.5, 9.5];
        let osc: Vec<Option<f64>> = closes.iter().map(|v| Some(v * 5.0)).collect();
        let div = detect_divergence(&closes, &osc, 11, 2).unwrap();
        assert_eq!(div.kind, DivergenceKind::None);
        assert_eq!(div.strength, 0.0);
    }

    #[test]
    fn test_invalid_window() {
        assert!(detect_divergence(&[1.0; 10], &[Some(1.0); 10], 3, 2).is_err());
    }
}
