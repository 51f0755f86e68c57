use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;

use cryptodash_core::signals::{SignalRepositoryTrait, TradeSignal};
use cryptodash_core::Result;

use super::model::TradeSignalDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::trade_signals;
use crate::utils::format_timestamp;

pub struct SignalRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl SignalRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn decode(rows: Vec<TradeSignalDB>) -> Result<Vec<TradeSignal>> {
        rows.into_iter()
            .map(|row| TradeSignal::try_from(row).map_err(Into::into))
            .collect()
    }
}

#[async_trait]
impl SignalRepositoryTrait for SignalRepository {
    async fn insert(&self, signal: TradeSignal) -> Result<TradeSignal> {
        let row = TradeSignalDB::try_from(signal.clone())?;
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(trade_signals::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(())
            })
            .await?;
        Ok(signal)
    }

    fn list_recent(&self, symbol: Option<&str>, limit: i64) -> Result<Vec<TradeSignal>> {
        let mut conn = get_connection(&self.pool)?;
        let mut query = trade_signals::table
            .select(TradeSignalDB::as_select())
            .into_boxed();
        if let Some(symbol) = symbol {
            query = query.filter(trade_signals::symbol.eq(symbol.to_string()));
        }
        let rows = query
            .order(trade_signals::created_at.desc())
            .limit(limit)
            .load::<TradeSignalDB>(&mut conn)
            .into_core()?;
        Self::decode(rows)
    }

    fn list_active(&self, symbol: &str, now: DateTime<Utc>) -> Result<Vec<TradeSignal>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = trade_signals::table
            .select(TradeSignalDB::as_select())
            .filter(trade_signals::symbol.eq(symbol))
            .filter(trade_signals::expires_at.gt(format_timestamp(now)))
            .order(trade_signals::created_at.desc())
            .load::<TradeSignalDB>(&mut conn)
            .into_core()?;
        Self::decode(rows)
    }
}
