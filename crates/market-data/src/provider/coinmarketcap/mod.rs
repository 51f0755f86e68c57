//! CoinMarketCap provider.
//!
//! Spot ticker with 24h change, volume and market cap from
//! `/v1/cryptocurrency/quotes/latest`. Requires an API key; the basic plan
//! allows 30 calls per minute.
//! API documentation: https://coinmarketcap.com/api/documentation/v1/

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{DataKind, Ticker};
use crate::provider::http;
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit};

const BASE_URL: &str = "https://pro-api.coinmarketcap.com";
const PROVIDER_ID: &str = "COINMARKETCAP";
const API_KEY_HEADER: &str = "X-CMC_PRO_API_KEY";

/// Status codes CMC uses for plan/minute/day/month quota exhaustion.
const RATE_LIMIT_CODES: &[i64] = &[1008, 1009, 1010, 1011];

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    status: Status,
    #[serde(default)]
    data: HashMap<String, Listing>,
}

#[derive(Debug, Deserialize)]
struct Status {
    error_code: i64,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    symbol: String,
    quote: HashMap<String, UsdQuote>,
}

#[derive(Debug, Deserialize)]
struct UsdQuote {
    price: Option<f64>,
    volume_24h: Option<f64>,
    percent_change_24h: Option<f64>,
    market_cap: Option<f64>,
    last_updated: Option<DateTime<Utc>>,
}

pub struct CoinMarketCapProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl CoinMarketCapProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http::build_client(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }
}

fn check_status(status: &Status) -> Result<(), MarketDataError> {
    if status.error_code == 0 {
        return Ok(());
    }

    let message = status.error_message.clone().unwrap_or_default();
    if RATE_LIMIT_CODES.contains(&status.error_code) {
        return Err(MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        });
    }
    if message.contains("\"symbol\"") {
        return Err(MarketDataError::SymbolNotFound(message));
    }
    Err(MarketDataError::provider(
        PROVIDER_ID,
        format!("error_code {}: {}", status.error_code, message),
    ))
}

fn parse_quote(body: &str, symbol: &str) -> Result<Ticker, MarketDataError> {
    let response: QuotesResponse = http::parse_json(PROVIDER_ID, body)?;
    check_status(&response.status)?;

    let listing = response
        .data
        .get(symbol)
        .or_else(|| response.data.values().next())
        .ok_or_else(|| MarketDataError::SymbolNotFound(symbol.to_string()))?;

    let usd = listing
        .quote
        .get("USD")
        .ok_or_else(|| MarketDataError::provider(PROVIDER_ID, "no USD quote in response"))?;

    let price = usd
        .price
        .ok_or_else(|| MarketDataError::NoData {
            provider: PROVIDER_ID.to_string(),
        })?;

    Ok(Ticker {
        symbol: listing.symbol.clone(),
        price,
        change_24h_pct: usd.percent_change_24h,
        volume_24h: usd.volume_24h,
        market_cap: usd.market_cap,
        time: usd.last_updated.unwrap_or_else(Utc::now),
        source: PROVIDER_ID.to_string(),
    })
}

#[async_trait]
impl MarketDataProvider for CoinMarketCapProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        2
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            data_kinds: &[DataKind::Ticker],
            intervals: &[],
            requires_api_key: true,
        }
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            burst: 5,
            ..RateLimit::default()
        }
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}/v1/cryptocurrency/quotes/latest", self.base_url);
        debug!("CoinMarketCap quote request for {}", symbol);

        let request = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("symbol", symbol), ("convert", "USD")]);

        // CMC reports bad symbols as HTTP 400 with a JSON status body.
        let body = match http::send(PROVIDER_ID, request).await {
            Err(MarketDataError::ProviderError { message, .. }) if message.contains("\"symbol\"") => {
                return Err(MarketDataError::SymbolNotFound(symbol.to_string()));
            }
            other => other?,
        };

        parse_quote(&body, symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quote() {
        let body = r#"{
            "status": {"error_code": 0, "error_message": null},
            "data": {
                "BTC": {
                    "id": 1,
                    "symbol": "BTC",
                    "quote": {
                        "USD": {
                            "price": 64000.5,
                            "volume_24h": 25000000000.0,
                            "percent_change_24h": -1.25,
                            "market_cap": 1260000000000.0,
                            "last_updated": "2024-05-01T12:00:00.000Z"
                        }
                    }
                }
            }
        }"#;

        let ticker = parse_quote(body, "BTC").unwrap();
        assert_eq!(ticker.price, 64000.5);
        assert_eq!(ticker.change_24h_pct, Some(-1.25));
        assert_eq!(ticker.market_cap, Some(1_260_000_000_000.0));
        assert_eq!(ticker.source, "COINMARKETCAP");
        assert_eq!(ticker.time.to_rfc3339(), "2024-05-01T12:00:00+00:00");
    }

    #[test]
    fn test_status_errors() {
        let body = r#"{"status": {"error_code": 1008, "error_message": "minute limit"}}"#;
        assert!(matches!(
            parse_quote(body, "BTC"),
            Err(MarketDataError::RateLimited { .. })
        ));

        let body = r#"{"status": {"error_code": 400, "error_message": "Invalid value for \"symbol\": \"ZZZ\""}}"#;
        assert!(matches!(
            parse_quote(body, "ZZZ"),
            Err(MarketDataError::SymbolNotFound(_))
        ));

        let body = r#"{"status": {"error_code": 1002, "error_message": "API key missing."}}"#;
        assert!(matches!(
            parse_quote(body, "BTC"),
            Err(MarketDataError::ProviderError { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_key_is_missing_api_key() {
        let provider = CoinMarketCapProvider::new(String::new());
        let err = provider.get_ticker("BTC").await.unwrap_err();
        assert!(matches!(err, MarketDataError::MissingApiKey { .. }));
    }
}
