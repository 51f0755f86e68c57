use async_trait::async_trait;
use chrono::{DateTime, Utc};

use cryptodash_market_data::Interval;

use super::signals_model::{AdvisorOpinion, AdvisorRequest, TradeSignal};
use crate::errors::Result;

/// Second opinion on a technical read, typically backed by an LLM.
#[async_trait]
pub trait SignalAdvisor: Send + Sync {
    async fn advise(&self, request: &AdvisorRequest) -> Result<AdvisorOpinion>;
}

/// Trait for trade signal persistence.
#[async_trait]
pub trait SignalRepositoryTrait: Send + Sync {
    async fn insert(&self, signal: TradeSignal) -> Result<TradeSignal>;
    /// Newest first, optionally for one symbol.
    fn list_recent(&self, symbol: Option<&str>, limit: i64) -> Result<Vec<TradeSignal>>;
    /// Signals for `symbol` not yet expired at `now`, newest first.
    fn list_active(&self, symbol: &str, now: DateTime<Utc>) -> Result<Vec<TradeSignal>>;
}

/// Trait for signal service operations.
#[async_trait]
pub trait SignalServiceTrait: Send + Sync {
    async fn generate(&self, symbol: &str, interval: Interval) -> Result<TradeSignal>;
    fn recent(&self, symbol: Option<&str>, limit: i64) -> Result<Vec<TradeSignal>>;
    fn active(&self, symbol: &str, now: DateTime<Utc>) -> Result<Vec<TradeSignal>>;
    fn has_advisor(&self) -> bool;
}
