use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest spot price for a symbol, with whatever 24h context the provider offers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticker {
    pub symbol: String,
    pub price: f64,
    /// Percent, e.g. `-2.5` for a 2.5% drop. Rolling 24h where the provider
    /// reports it (CoinMarketCap); since the UTC-day open for Kraken.
    pub change_24h_pct: Option<f64>,
    /// Quote-currency volume over the last 24h.
    pub volume_24h: Option<f64>,
    pub market_cap: Option<f64>,
    pub time: DateTime<Utc>,
    pub source: String,
}
