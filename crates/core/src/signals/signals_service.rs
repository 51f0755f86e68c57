use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use uuid::Uuid;

use cryptodash_market_data::{normalize_symbol, Interval};

use super::signals_model::{
    signal_expiry, AdvisorRequest, SignalLevels, SignalSource, TradeSignal,
};
use super::signals_scoring::{pivot_levels, score_signal};
use super::signals_traits::{SignalAdvisor, SignalRepositoryTrait, SignalServiceTrait};
use crate::errors::Result;
use crate::indicators::TechnicalSnapshot;
use crate::market::MarketServiceTrait;

/// Candles requested for a signal.
const SIGNAL_WINDOW: usize = 200;

pub struct SignalService {
    market: Arc<dyn MarketServiceTrait>,
    repository: Arc<dyn SignalRepositoryTrait>,
    advisor: Option<Arc<dyn SignalAdvisor>>,
}

impl SignalService {
    pub fn new(
        market: Arc<dyn MarketServiceTrait>,
        repository: Arc<dyn SignalRepositoryTrait>,
        advisor: Option<Arc<dyn SignalAdvisor>>,
    ) -> Self {
        Self {
            market,
            repository,
            advisor,
        }
    }
}

#[async_trait]
impl SignalServiceTrait for SignalService {
    async fn generate(&self, symbol: &str, interval: Interval) -> Result<TradeSignal> {
        let symbol = normalize_symbol(symbol)?;
        let candles = self
            .market
            .candles(&symbol, interval, Some(SIGNAL_WINDOW))
            .await?;
        let snapshot = TechnicalSnapshot::compute(&candles.data)?;
        let derivatives = self.market.derivatives_context(&symbol, interval).await;
        let technical = score_signal(&snapshot, &derivatives);
        debug!(
            "Technical score for {} {}: {:.1} ({})",
            symbol, interval, technical.score, technical.direction
        );

        let entry = snapshot.close;
        let mut direction = technical.direction;
        let mut confidence = technical.confidence;
        let mut levels = pivot_levels(direction, entry, &snapshot.pivots);
        let mut rationale = if technical.reasons.is_empty() {
            "No clear technical bias".to_string()
        } else {
            technical.reasons.join("; ")
        };
        let mut source = SignalSource::Technical;

        if let Some(advisor) = &self.advisor {
            let request = AdvisorRequest {
                symbol: symbol.clone(),
                interval,
                snapshot: snapshot.clone(),
                derivatives: derivatives.clone(),
                technical: technical.clone(),
            };
            match advisor.advise(&request).await {
                Ok(opinion) => {
                    direction = opinion.direction;
                    confidence = opinion.confidence.min(100);
                    let proposed = SignalLevels {
                        entry,
                        stop_loss: opinion.stop_loss,
                        take_profit: opinion.take_profit,
                    };
                    levels = if proposed.is_consistent(direction) {
                        proposed
                    } else {
                        warn!(
                            "Advisor levels for {} {} are inconsistent ({:?}), using pivots",
                            symbol, direction, proposed
                        );
                        pivot_levels(direction, entry, &snapshot.pivots)
                    };
                    if !opinion.rationale.trim().is_empty() {
                        rationale = opinion.rationale.trim().to_string();
                    }
                    source = SignalSource::Ai;
                }
                Err(e) => {
                    warn!("Advisor failed for {}, keeping technical signal: {}", symbol, e);
                }
            }
        }

        let indicators = serde_json::json!({
            "snapshot": snapshot,
            "derivatives": derivatives,
            "technical": technical,
        });

        let created_at = Utc::now();
        let signal = TradeSignal {
            id: Uuid::now_v7().to_string(),
            symbol,
            interval,
            direction,
            confidence,
            score: technical.score,
            entry_price: entry,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            rationale,
            source,
            indicators,
            created_at,
            expires_at: signal_expiry(created_at, interval),
        };

        info!(
            "Generated {} {} signal for {} {} (confidence {})",
            signal.source.as_str(),
            signal.direction,
            signal.symbol,
            interval,
            signal.confidence
        );
        self.repository.insert(signal).await
    }

    fn recent(&self, symbol: Option<&str>, limit: i64) -> Result<Vec<TradeSignal>> {
        let symbol = symbol.map(normalize_symbol).transpose()?;
        self.repository.list_recent(symbol.as_deref(), limit.clamp(1, 500))
    }

    fn active(&self, symbol: &str, now: DateTime<Utc>) -> Result<Vec<TradeSignal>> {
        let symbol = normalize_symbol(symbol)?;
        self.repository.list_active(&symbol, now)
    }

    fn has_advisor(&self) -> bool {
        self.advisor.is_some()
    }
}
