//! Database model for persisted trade signals.

use diesel::prelude::*;

use cryptodash_core::signals::TradeSignal;

use crate::errors::StorageError;
use crate::utils::{format_timestamp, parse_timestamp};

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::trade_signals)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TradeSignalDB {
    pub id: String,
    pub symbol: String,
    pub interval: String,
    pub direction: String,
    pub confidence: i32,
    pub score: f64,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub rationale: String,
    pub source: String,
    pub indicators: String,
    pub created_at: String,
    pub expires_at: String,
}

fn decode_err(field: &str, detail: impl std::fmt::Display) -> StorageError {
    StorageError::SerializationError(format!("trade_signals.{}: {}", field, detail))
}

impl TryFrom<TradeSignal> for TradeSignalDB {
    type Error = StorageError;

    fn try_from(signal: TradeSignal) -> Result<Self, Self::Error> {
        Ok(Self {
            id: signal.id,
            symbol: signal.symbol,
            interval: signal.interval.as_str().to_string(),
            direction: signal.direction.as_str().to_string(),
            confidence: i32::from(signal.confidence),
            score: signal.score,
            entry_price: signal.entry_price,
            stop_loss: signal.stop_loss,
            take_profit: signal.take_profit,
            rationale: signal.rationale,
            source: signal.source.as_str().to_string(),
            indicators: serde_json::to_string(&signal.indicators)?,
            created_at: format_timestamp(signal.created_at),
            expires_at: format_timestamp(signal.expires_at),
        })
    }
}

impl TryFrom<TradeSignalDB> for TradeSignal {
    type Error = StorageError;

    fn try_from(row: TradeSignalDB) -> Result<Self, Self::Error> {
        Ok(Self {
            interval: row.interval.parse().map_err(|e| decode_err("interval", e))?,
            direction: row.direction.parse().map_err(|e| decode_err("direction", e))?,
            confidence: u8::try_from(row.confidence).map_err(|e| decode_err("confidence", e))?,
            source: row.source.parse().map_err(|e| decode_err("source", e))?,
            indicators: serde_json::from_str(&row.indicators)?,
            created_at: parse_timestamp(&row.created_at)?,
            expires_at: parse_timestamp(&row.expires_at)?,
            id: row.id,
            symbol: row.symbol,
            score: row.score,
            entry_price: row.entry_price,
            stop_loss: row.stop_loss,
            take_profit: row.take_profit,
            rationale: row.rationale,
        })
    }
}
