//! CoinGlass v4 derivatives provider.
//!
//! - Funding rate OHLC history (Binance perpetual)
//! - Aggregated open interest OHLC history
//! - Aggregated liquidation history (Binance)
//! - Global long/short account ratio history (Binance perpetual)
//!
//! Requires an API key. Every response is wrapped in `{code, msg, data}`
//! where `code == "0"` means success. Numeric fields arrive as either JSON
//! numbers or strings depending on the endpoint.
//! API documentation: https://docs.coinglass.com/v4.0-en/reference

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{
    DataKind, FundingRatePoint, Interval, LiquidationPoint, LongShortRatioPoint,
    OpenInterestPoint,
};
use crate::provider::http::{self, de_f64, de_opt_f64};
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit};

const BASE_URL: &str = "https://open-api-v4.coinglass.com";
const PROVIDER_ID: &str = "COINGLASS";
const API_KEY_HEADER: &str = "CG-API-KEY";
const EXCHANGE: &str = "Binance";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: Value,
    #[serde(default)]
    msg: Option<String>,
    data: Option<T>,
}

/// OHLC row used by the funding-rate and open-interest endpoints.
#[derive(Debug, Deserialize)]
struct OhlcRow {
    time: i64,
    #[serde(deserialize_with = "de_f64")]
    close: f64,
}

#[derive(Debug, Deserialize)]
struct LiquidationRow {
    time: i64,
    #[serde(default, deserialize_with = "de_opt_f64")]
    aggregated_long_liquidation_usd: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    aggregated_short_liquidation_usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct LongShortRow {
    time: i64,
    #[serde(deserialize_with = "de_f64")]
    global_account_long_percent: f64,
    #[serde(deserialize_with = "de_f64")]
    global_account_short_percent: f64,
    #[serde(default, deserialize_with = "de_opt_f64")]
    global_account_long_short_ratio: Option<f64>,
}

pub struct CoinGlassProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CoinGlassProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http::build_client(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, MarketDataError> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}{}", self.base_url, endpoint);
        debug!("CoinGlass request: {} {:?}", endpoint, params);

        let request = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(params);

        let body = http::send(PROVIDER_ID, request).await?;
        unwrap_envelope(&body)
    }
}

/// Binance USDT-margined perpetual for a base asset.
fn perp_pair(symbol: &str) -> String {
    format!("{}USDT", symbol)
}

fn series_params(symbol: String, interval: Interval, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("symbol", symbol),
        ("interval", interval.as_str().to_string()),
        ("limit", limit.to_string()),
    ]
}

fn unwrap_envelope<T: DeserializeOwned>(body: &str) -> Result<Vec<T>, MarketDataError> {
    let envelope: Envelope<Vec<T>> = http::parse_json(PROVIDER_ID, body)?;

    let code = match &envelope.code {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if code != "0" {
        let msg = envelope.msg.unwrap_or_default();
        return Err(match code.as_str() {
            "429" => MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            },
            "401" | "403" => MarketDataError::provider(PROVIDER_ID, format!("unauthorized: {}", msg)),
            _ => MarketDataError::provider(PROVIDER_ID, format!("code {}: {}", code, msg)),
        });
    }

    match envelope.data {
        Some(rows) if !rows.is_empty() => Ok(rows),
        _ => Err(MarketDataError::NoData {
            provider: PROVIDER_ID.to_string(),
        }),
    }
}

fn time_of(raw: i64) -> Result<chrono::DateTime<chrono::Utc>, MarketDataError> {
    http::timestamp(raw)
        .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, format!("bad timestamp {}", raw)))
}

/// Keep the newest `limit` rows, oldest first.
fn newest<T>(mut rows: Vec<T>, limit: usize) -> Vec<T> {
    let skip = rows.len().saturating_sub(limit);
    rows.split_off(skip)
}

/// CoinGlass quotes funding in percent; the model stores a fraction.
fn to_funding(rows: Vec<OhlcRow>) -> Result<Vec<FundingRatePoint>, MarketDataError> {
    rows.into_iter()
        .map(|row| {
            Ok(FundingRatePoint {
                time: time_of(row.time)?,
                rate: row.close / 100.0,
            })
        })
        .collect()
}

fn to_open_interest(rows: Vec<OhlcRow>) -> Result<Vec<OpenInterestPoint>, MarketDataError> {
    rows.into_iter()
        .map(|row| {
            Ok(OpenInterestPoint {
                time: time_of(row.time)?,
                open_interest_usd: row.close,
            })
        })
        .collect()
}

fn to_liquidations(rows: Vec<LiquidationRow>) -> Result<Vec<LiquidationPoint>, MarketDataError> {
    rows.into_iter()
        .map(|row| {
            Ok(LiquidationPoint {
                time: time_of(row.time)?,
                long_usd: row.aggregated_long_liquidation_usd.unwrap_or(0.0),
                short_usd: row.aggregated_short_liquidation_usd.unwrap_or(0.0),
            })
        })
        .collect()
}

fn to_long_short(rows: Vec<LongShortRow>) -> Result<Vec<LongShortRatioPoint>, MarketDataError> {
    rows.into_iter()
        .map(|row| {
            let ratio = row.global_account_long_short_ratio.unwrap_or_else(|| {
                if row.global_account_short_percent > 0.0 {
                    row.global_account_long_percent / row.global_account_short_percent
                } else {
                    f64::NAN
                }
            });
            Ok(LongShortRatioPoint {
                time: time_of(row.time)?,
                long_pct: row.global_account_long_percent,
                short_pct: row.global_account_short_percent,
                ratio,
            })
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for CoinGlassProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        1
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &[
                DataKind::FundingRate,
                DataKind::OpenInterest,
                DataKind::Liquidations,
                DataKind::LongShortRatio,
            ],
            intervals: &Interval::ALL,
            requires_api_key: true,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        // Hobbyist plan: 30 requests per minute.
        RateLimit {
            requests_per_minute: 30,
            burst: 4,
            ..RateLimit::default()
        }
    }

    async fn get_funding_rates(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<FundingRatePoint>, MarketDataError> {
        let mut params = series_params(perp_pair(symbol), interval, limit);
        params.push(("exchange", EXCHANGE.to_string()));
        let rows: Vec<OhlcRow> = self.fetch("/api/futures/funding-rate/history", &params).await?;
        to_funding(newest(rows, limit))
    }

    async fn get_open_interest(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<OpenInterestPoint>, MarketDataError> {
        let params = series_params(symbol.to_string(), interval, limit);
        let rows: Vec<OhlcRow> = self
            .fetch("/api/futures/open-interest/aggregated-history", &params)
            .await?;
        to_open_interest(newest(rows, limit))
    }

    async fn get_liquidations(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<LiquidationPoint>, MarketDataError> {
        let mut params = series_params(symbol.to_string(), interval, limit);
        params.push(("exchange_list", EXCHANGE.to_string()));
        let rows: Vec<LiquidationRow> = self
            .fetch("/api/futures/liquidation/aggregated-history", &params)
            .await?;
        to_liquidations(newest(rows, limit))
    }

    async fn get_long_short_ratio(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Vec<LongShortRatioPoint>, MarketDataError> {
        let mut params = series_params(perp_pair(symbol), interval, limit);
        params.push(("exchange", EXCHANGE.to_string()));
        let rows: Vec<LongShortRow> = self
            .fetch("/api/futures/global-long-short-account-ratio/history", &params)
            .await?;
        to_long_short(newest(rows, limit))
    }
}
