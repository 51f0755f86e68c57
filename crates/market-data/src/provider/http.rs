//! Plumbing shared by the HTTP providers.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;

use crate::errors::MarketDataError;

/// Longest body excerpt carried into error messages.
const MAX_ERROR_BODY: usize = 200;

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("cryptodash/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Send `request` and return the body of a 2xx response.
///
/// Non-2xx statuses go through [`MarketDataError::from_status`].
pub(crate) async fn send(provider: &str, request: RequestBuilder) -> Result<String, MarketDataError> {
    let response = request
        .send()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| MarketDataError::from_transport(provider, e))?;

    if !status.is_success() {
        debug!("{} returned {}: {}", provider, status, excerpt(&body));
        return Err(MarketDataError::from_status(provider, status, excerpt(&body)));
    }

    Ok(body)
}

/// Deserialize a response body, mapping failures to a provider error.
pub(crate) fn parse_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| {
        MarketDataError::provider(provider, format!("Failed to parse response: {}", e))
    })
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// Accepts `1.5`, `"1.5"`, and `null`/`""` (as `None`).
pub fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Str(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Str(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Str(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("invalid number: {}", s))),
    }
}

/// Like [`de_opt_f64`] but the value must be present.
pub(crate) fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_f64(deserializer)?.ok_or_else(|| de::Error::custom("missing number"))
}

/// Parse a string-or-number JSON value that is already in hand.
pub(crate) fn value_f64(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Timestamps in either seconds or milliseconds since the epoch.
pub(crate) fn timestamp(raw: i64) -> Option<DateTime<Utc>> {
    // Anything past year 2286 in seconds is really milliseconds.
    if raw.abs() >= 10_000_000_000 {
        Utc.timestamp_millis_opt(raw).single()
    } else {
        Utc.timestamp_opt(raw, 0).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Row {
        #[serde(deserialize_with = "de_f64")]
        a: f64,
        #[serde(default, deserialize_with = "de_opt_f64")]
        b: Option<f64>,
    }

    #[test]
    fn test_numbers_and_strings_both_parse() {
        let row: Row = serde_json::from_str(r#"{"a": "1.25", "b": 3}"#).unwrap();
        assert_eq!(row.a, 1.25);
        assert_eq!(row.b, Some(3.0));

        let row: Row = serde_json::from_str(r#"{"a": 2, "b": ""}"#).unwrap();
        assert_eq!(row.a, 2.0);
        assert_eq!(row.b, None);

        let row: Row = serde_json::from_str(r#"{"a": 2}"#).unwrap();
        assert_eq!(row.b, None);

        assert!(serde_json::from_str::<Row>(r#"{"a": "abc"}"#).is_err());
    }

    #[test]
    fn test_timestamp_seconds_or_millis() {
        let secs = timestamp(1_700_000_000).unwrap();
        let millis = timestamp(1_700_000_000_000).unwrap();
        assert_eq!(secs, millis);
    }

    #[test]
    fn test_excerpt_respects_char_boundaries() {
        let body = "é".repeat(300);
        assert_eq!(excerpt(&body).chars().count(), MAX_ERROR_BODY);
    }
}
