//! Provider capabilities and rate limiting configuration.

use std::time::Duration;

use serde::Serialize;

use crate::models::{DataKind, Interval};

/// Describes what a market data provider can serve.
///
/// The registry only routes a request to providers whose `data_kinds`
/// include the requested kind.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderCapabilities {
    pub data_kinds: &'static [DataKind],

    /// Resolutions the provider understands for series requests.
    pub intervals: &'static [Interval],

    pub requires_api_key: bool,
}

impl ProviderCapabilities {
    pub fn supports(&self, kind: DataKind) -> bool {
        self.data_kinds.contains(&kind)
    }
}

/// Rate limiting configuration for a provider.
///
/// Feeds the per-provider token bucket: `burst` tokens up front, refilled at
/// `requests_per_minute / 60` per second.
#[derive(Clone, Debug)]
pub struct RateLimit {
    pub requests_per_minute: u32,
    pub burst: u32,
    /// Minimum spacing between two calls, applied on top of the bucket.
    pub min_delay: Duration,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
            burst: 10,
            min_delay: Duration::ZERO,
        }
    }
}
