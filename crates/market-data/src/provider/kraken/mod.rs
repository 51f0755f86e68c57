//! Kraken public REST API.
//!
//! - OHLC via `/0/public/OHLC`
//! - Spot ticker via `/0/public/Ticker`
//!
//! No API key. Kraken's public tier allows roughly one call per second and
//! returns at most 720 bars per OHLC request.
//! API documentation: https://docs.kraken.com/api/

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::errors::MarketDataError;
use crate::models::{Candle, DataKind, Interval, Ticker};
use crate::provider::http::{self, value_f64};
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit};

const BASE_URL: &str = "https://api.kraken.com";
const PROVIDER_ID: &str = "KRAKEN";

/// Every result object carries these envelopes.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    error: Vec<String>,
    #[serde(default)]
    result: Option<Map<String, Value>>,
}

/// Ticker entry, keyed by Kraken's pair name inside `result`.
#[derive(Debug, Deserialize)]
struct TickerEntry {
    /// Last trade `[price, lot volume]`.
    c: Vec<String>,
    /// Volume `[today, last 24 hours]`, base currency.
    #[serde(default)]
    v: Vec<String>,
    /// VWAP `[today, last 24 hours]`.
    #[serde(default)]
    p: Vec<String>,
    /// Opening price of the current UTC day.
    #[serde(default)]
    o: Option<String>,
}

pub struct KrakenProvider {
    client: Client,
}

impl KrakenProvider {
    pub fn new() -> Self {
        Self {
            client: http::build_client(),
        }
    }

    async fn fetch(&self, endpoint: &str, params: &[(&str, String)]) -> Result<Map<String, Value>, MarketDataError> {
        let url = format!("{}{}", BASE_URL, endpoint);
        debug!("Kraken request: {} {:?}", endpoint, params);

        let body = http::send(PROVIDER_ID, self.client.get(&url).query(params)).await?;
        unwrap_envelope(&body)
    }
}

impl Default for KrakenProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Kraken names bitcoin `XBT`.
fn kraken_pair(symbol: &str) -> String {
    let base = if symbol == "BTC" { "XBT" } else { symbol };
    format!("{}USD", base)
}

fn unwrap_envelope(body: &str) -> Result<Map<String, Value>, MarketDataError> {
    let envelope: Envelope = http::parse_json(PROVIDER_ID, body)?;

    if let Some(first) = envelope.error.first() {
        return Err(map_body_error(first));
    }

    envelope
        .result
        .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "response has no result"))
}

fn map_body_error(error: &str) -> MarketDataError {
    if error.contains("Unknown asset pair") {
        MarketDataError::SymbolNotFound(error.to_string())
    } else if error.contains("Rate limit") || error.contains("Too many requests") {
        MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        }
    } else {
        MarketDataError::provider(PROVIDER_ID, error)
    }
}

/// The OHLC result holds one pair key plus `last`.
fn parse_ohlc(result: &Map<String, Value>, limit: usize) -> Result<Vec<Candle>, MarketDataError> {
    let rows = result
        .iter()
        .find(|(key, _)| key.as_str() != "last")
        .and_then(|(_, value)| value.as_array())
        .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "OHLC result has no pair data"))?;

    let mut candles = Vec::with_capacity(rows.len());
    for row in rows {
        // [time, open, high, low, close, vwap, volume, count]
        let Some(fields) = row.as_array() else {
            continue;
        };
        if fields.len() < 7 {
            continue;
        }
        let time = fields[0].as_i64().and_then(http::timestamp);
        let values: Option<Vec<f64>> = [1, 2, 3, 4, 6].iter().map(|&i| value_f64(&fields[i])).collect();

        match (time, values) {
            (Some(time), Some(v)) => candles.push(Candle::new(time, v[0], v[1], v[2], v[3], v[4])),
            _ => debug!("Kraken: skipping malformed OHLC row {:?}", row),
        }
    }

    if candles.is_empty() {
        return Err(MarketDataError::NoData {
            provider: PROVIDER_ID.to_string(),
        });
    }

    let skip = candles.len().saturating_sub(limit);
    Ok(candles.split_off(skip))
}

fn parse_ticker(result: &Map<String, Value>, symbol: &str) -> Result<Ticker, MarketDataError> {
    let value = result
        .values()
        .next()
        .ok_or_else(|| MarketDataError::NoData {
            provider: PROVIDER_ID.to_string(),
        })?;

    let entry: TickerEntry = serde_json::from_value(value.clone())
        .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Failed to parse ticker: {}", e)))?;

    let parse = |s: Option<&String>| s.and_then(|s| s.parse::<f64>().ok());

    let price = parse(entry.c.first())
        .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "ticker has no last price"))?;
    // Kraken has no 24h-ago price; the change is measured from the open of
    // the current UTC day.
    let open = parse(entry.o.as_ref());
    let change_24h_pct = open.filter(|o| *o > 0.0).map(|o| (price - o) / o * 100.0);

    // Base volume times VWAP gives an approximate USD volume.
    let volume_24h = match (parse(entry.v.get(1)), parse(entry.p.get(1))) {
        (Some(volume), Some(vwap)) => Some(volume * vwap),
        _ => None,
    };

    Ok(Ticker {
        symbol: symbol.to_string(),
        price,
        change_24h_pct,
        volume_24h,
        market_cap: None,
        time: Utc::now(),
        source: PROVIDER_ID.to_string(),
    })
}

#[async_trait]
impl MarketDataProvider for KrakenProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &[DataKind::Candles, DataKind::Ticker],
            intervals: &Interval::ALL,
            requires_api_key: false,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 60,
            burst: 5,
            ..RateLimit::default()
        }
    }

    async fn get_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<Candle>, MarketDataError> {
        let params = [
            ("pair", kraken_pair(symbol)),
            ("interval", interval.minutes().to_string()),
        ];
        let result = self.fetch("/0/public/OHLC", &params).await?;
        parse_ohlc(&result, limit)
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        let params = [("pair", kraken_pair(symbol))];
        let result = self.fetch("/0/public/Ticker", &params).await?;
        parse_ticker(&result, symbol)
    }
}
