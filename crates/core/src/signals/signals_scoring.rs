//! Rule-based technical score, plus stop/target selection from pivots.

use crate::indicators::{CloudPosition, DivergenceKind, PivotPoints, TechnicalSnapshot};

use super::signals_model::{DerivativesContext, Direction, SignalLevels, SignalScore};

/// Below this absolute score a signal is Neutral.
pub const NEUTRAL_BAND: f64 = 20.0;

const TREND_WEIGHT: f64 = 20.0;
const RSI_WEIGHT: f64 = 15.0;
const MACD_WEIGHT: f64 = 15.0;
const CLOUD_WEIGHT: f64 = 15.0;
const DIVERGENCE_WEIGHT: f64 = 15.0;
const FUNDING_WEIGHT: f64 = 10.0;
const CROWDING_WEIGHT: f64 = 10.0;
const OPEN_INTEREST_WEIGHT: f64 = 5.0;
const LIQUIDATION_WEIGHT: f64 = 5.0;

/// 0.05% per funding period.
const FUNDING_HOT: f64 = 0.0005;
/// -0.01% per funding period.
const FUNDING_COLD: f64 = -0.0001;
const OPEN_INTEREST_MOVE_PCT: f64 = 5.0;
const LIQUIDATION_SKEW: f64 = 0.5;

/// Score a snapshot and derivatives context into `[-100, 100]`.
///
/// Momentum and crowding inputs are read contrarian: overbought RSI, hot
/// funding and crowded longs all push the score down.
pub fn score_signal(snapshot: &TechnicalSnapshot, derivatives: &DerivativesContext) -> SignalScore {
    let mut score = 0.0;
    let mut reasons = Vec::new();
    let mut trend = 0.0;

    if let (Some(fast), Some(slow)) = (snapshot.ema20, snapshot.ema50) {
        if fast > slow {
            trend = 1.0;
            reasons.push(format!("EMA20 {:.2} above EMA50 {:.2}", fast, slow));
        } else if fast < slow {
            trend = -1.0;
            reasons.push(format!("EMA20 {:.2} below EMA50 {:.2}", fast, slow));
        }
        score += trend * TREND_WEIGHT;
    }

    if let Some(rsi) = snapshot.rsi14 {
        let contribution = if rsi < 30.0 {
            reasons.push(format!("RSI {:.1} oversold", rsi));
            RSI_WEIGHT
        } else if rsi > 70.0 {
            reasons.push(format!("RSI {:.1} overbought", rsi));
            -RSI_WEIGHT
        } else {
            (50.0 - rsi) / 20.0 * RSI_WEIGHT
        };
        score += contribution;
    }

    if let Some(macd) = snapshot.macd {
        if macd.histogram > 0.0 {
            score += MACD_WEIGHT;
            reasons.push("MACD histogram positive".to_string());
        } else if macd.histogram < 0.0 {
            score -= MACD_WEIGHT;
            reasons.push("MACD histogram negative".to_string());
        }
    }

    match snapshot.ichimoku.cloud {
        Some(CloudPosition::Above) => {
            score += CLOUD_WEIGHT;
            reasons.push("price above Ichimoku cloud".to_string());
        }
        Some(CloudPosition::Below) => {
            score -= CLOUD_WEIGHT;
            reasons.push("price below Ichimoku cloud".to_string());
        }
        Some(CloudPosition::Inside) | None => {}
    }

    let divergence = snapshot.divergence;
    if divergence.kind != DivergenceKind::None {
        score += divergence.kind.bias() * DIVERGENCE_WEIGHT * divergence.strength;
        reasons.push(format!(
            "{:?} RSI divergence (strength {:.2})",
            divergence.kind, divergence.strength
        ));
    }

    if let Some(rate) = derivatives.funding_rate {
        if rate > FUNDING_HOT {
            score -= FUNDING_WEIGHT;
            reasons.push(format!("funding {:.4}% crowded long", rate * 100.0));
        } else if rate < FUNDING_COLD {
            score += FUNDING_WEIGHT;
            reasons.push(format!("funding {:.4}% crowded short", rate * 100.0));
        }
    }

    if let Some(ratio) = derivatives.long_short_ratio {
        if ratio > 2.0 {
            score -= CROWDING_WEIGHT;
            reasons.push(format!("long/short ratio {:.2}", ratio));
        } else if ratio < 0.5 {
            score += CROWDING_WEIGHT;
            reasons.push(format!("long/short ratio {:.2}", ratio));
        }
    }

    if let Some(change) = derivatives.open_interest_change_pct {
        if change.abs() > OPEN_INTEREST_MOVE_PCT && trend != 0.0 {
            score += trend * OPEN_INTEREST_WEIGHT;
            reasons.push(format!("open interest {:+.1}% with trend", change));
        }
    }

    if let Some(imbalance) = derivatives.liquidation_imbalance {
        if imbalance > LIQUIDATION_SKEW {
            score += LIQUIDATION_WEIGHT;
            reasons.push("long liquidations dominate, bounce risk".to_string());
        } else if imbalance < -LIQUIDATION_SKEW {
            score -= LIQUIDATION_WEIGHT;
            reasons.push("short liquidations dominate, pullback risk".to_string());
        }
    }

    let score = score.clamp(-100.0, 100.0);
    let direction = direction_for(score);

    SignalScore {
        score,
        direction,
        confidence: score.abs().min(100.0).round() as u8,
        reasons,
    }
}

pub fn direction_for(score: f64) -> Direction {
    if score.abs() < NEUTRAL_BAND {
        Direction::Neutral
    } else if score > 0.0 {
        Direction::Long
    } else {
        Direction::Short
    }
}

/// Stop and target from pivots: S1/R1 by default, falling back to the next
/// level out when price has already crossed the first one.
pub fn pivot_levels(direction: Direction, entry: f64, pivots: &PivotPoints) -> SignalLevels {
    let below = [pivots.s1, pivots.s2, pivots.s3].into_iter().find(|l| *l < entry);
    let above = [pivots.r1, pivots.r2, pivots.r3].into_iter().find(|l| *l > entry);

    let (stop_loss, take_profit) = match direction {
        Direction::Long => (below, above),
        Direction::Short => (above, below),
        Direction::Neutral => (None, None),
    };

    SignalLevels {
        entry,
        stop_loss,
        take_profit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{Divergence, IchimokuPoint, MacdPoint};
    use chrono::Utc;

    fn snapshot() -> TechnicalSnapshot {
        TechnicalSnapshot {
            time: Utc::now(),
            close: 100.0,
            ema20: Some(101.0),
            ema50: Some(99.0),
            rsi14: Some(50.0),
            macd: Some(MacdPoint {
                macd: 1.0,
                signal: 0.5,
                histogram: 0.5,
            }),
            ichimoku: IchimokuPoint {
                tenkan: None,
                kijun: None,
                senkou_a: Some(95.0),
                senkou_b: Some(90.0),
                cloud: Some(CloudPosition::Above),
            },
            pivots: PivotPoints::classic(105.0, 95.0, 100.0),
            divergence: Divergence::none(),
        }
    }

    #[test]
    fn test_bullish_technical_score() {
        let score = score_signal(&snapshot(), &DerivativesContext::default());
        // trend 20 + rsi 0 + macd 15 + cloud 15
        assert_eq!(score.score, 50.0);
        assert_eq!(score.direction, Direction::Long);
        assert_eq!(score.confidence, 50);
        assert_eq!(score.reasons.len(), 3);
    }

    #[test]
    fn test_rsi_scaling() {
        let mut snap = snapshot();
        snap.rsi14 = Some(60.0);
        let score = score_signal(&snap, &DerivativesContext::default());
        assert_eq!(score.score, 50.0 - 7.5);

        snap.rsi14 = Some(80.0);
        assert_eq!(score_signal(&snap, &DerivativesContext::default()).score, 35.0);
    }

    #[test]
    fn test_contrarian_derivatives() {
        let derivatives = DerivativesContext {
            funding_rate: Some(0.001),
            open_interest_change_pct: Some(8.0),
            long_short_ratio: Some(2.5),
            liquidation_imbalance: Some(-0.8),
        };
        let score = score_signal(&snapshot(), &derivatives);
        // 50 - 10 (funding) - 10 (crowding) + 5 (OI with trend) - 5 (short liqs)
        assert_eq!(score.score, 30.0);
    }

    #[test]
    fn test_neutral_band() {
        let mut snap = snapshot();
        snap.macd = None;
        snap.ichimoku.cloud = Some(CloudPosition::Inside);
        let score = score_signal(&snap, &DerivativesContext::default());
        assert_eq!(score.score, 20.0);
        assert_eq!(score.direction, Direction::Long);

        snap.rsi14 = Some(55.0);
        let score = score_signal(&snap, &DerivativesContext::default());
        assert_eq!(score.direction, Direction::Neutral);
    }

    #[test]
    fn test_bearish_divergence_weighted_by_strength() {
        let mut snap = snapshot();
        snap.divergence = Divergence {
            kind: DivergenceKind::Bearish,
            strength: 0.4,
            swings: Some((10, 20)),
        };
        let score = score_signal(&snap, &DerivativesContext::default());
        assert!((score.score - 44.0).abs() < 1e-9);
    }

    #[test]
    fn test_pivot_levels() {
        let pivots = PivotPoints::classic(105.0, 95.0, 100.0);
        let long = pivot_levels(Direction::Long, 100.0, &pivots);
        assert_eq!(long.stop_loss, Some(pivots.s1));
        assert_eq!(long.take_profit, Some(pivots.r1));
        assert!(long.is_consistent(Direction::Long));

        let short = pivot_levels(Direction::Short, 100.0, &pivots);
        assert_eq!(short.stop_loss, Some(pivots.r1));
        assert!(short.is_consistent(Direction::Short));

        // Price already through R1: target moves out to R2.
        let breakout = pivot_levels(Direction::Long, 106.0, &pivots);
        assert_eq!(breakout.take_profit, Some(pivots.r2));

        let neutral = pivot_levels(Direction::Neutral, 100.0, &pivots);
        assert!(neutral.stop_loss.is_none() && neutral.take_profit.is_none());
    }
}
