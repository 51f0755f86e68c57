//! Tatum exchange-rate provider.
//!
//! Price-only ticker from `/v3/tatum/rate/{symbol}`. Requires an API key.
//! API documentation: https://apidoc.tatum.io/

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

use crate::errors::MarketDataError;
use crate::models::{DataKind, Ticker};
use crate::provider::http::{self, de_opt_f64};
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit};

const BASE_URL: &str = "https://api.tatum.io";
const PROVIDER_ID: &str = "TATUM";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateResponse {
    id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    value: Option<f64>,
    timestamp: Option<i64>,
}

pub struct TatumProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TatumProvider {
    pub fn new(api_key: String) -> Self {
        Self {
            client: http::build_client(),
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }
}

fn parse_rate(body: &str, symbol: &str) -> Result<Ticker, MarketDataError> {
    let rate: RateResponse = http::parse_json(PROVIDER_ID, body)?;

    let price = rate.value.ok_or_else(|| MarketDataError::NoData {
        provider: PROVIDER_ID.to_string(),
    })?;

    Ok(Ticker {
        symbol: rate.id.unwrap_or_else(|| symbol.to_string()),
        price,
        change_24h_pct: None,
        volume_24h: None,
        market_cap: None,
        time: rate.timestamp.and_then(http::timestamp).unwrap_or_else(Utc::now),
        source: PROVIDER_ID.to_string(),
    })
}

#[async_trait]
impl MarketDataProvider for TatumProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn priority(&self) -> u8 {
        3
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
            requests_per_minute: 180,
            burst: 3,
            ..RateLimit::default()
        }
    }

    async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
        if self.api_key.trim().is_empty() {
            return Err(MarketDataError::MissingApiKey {
                provider: PROVIDER_ID.to_string(),
            });
        }

        let url = format!("{}/v3/tatum/rate/{}", self.base_url, symbol);
        debug!("Tatum rate request for {}", symbol);

        let request = self
            .client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .query(&[("basePair", "USD")]);

        let body = http::send(PROVIDER_ID, request).await?;
        parse_rate(&body, symbol)
    }
}
