//! Provider registry: routes each request through the capable providers in
//! priority order, with rate limiting, circuit breaking, retry and validation.

use std::future::Future;
use std::sync::Arc;

use log::{debug, info, warn};
use serde::Serialize;

use super::backoff::{retry_with_backoff, BackoffPolicy};
use super::validator::Validate;
use super::{CircuitBreaker, CircuitSnapshot, RateLimiter};
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{
    Candle, DataKind, FundingRatePoint, Interval, LiquidationPoint, LongShortRatioPoint,
    OpenInterestPoint, Ticker,
};
use crate::provider::{MarketDataProvider, ProviderCapabilities};

/// A validated payload and the provider that produced it.
#[derive(Clone, Debug)]
pub struct Fetched<T> {
    pub data: T,
    pub provider: &'static str,
}

/// Diagnostics for one registered provider.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderInfo {
    pub id: &'static str,
    pub priority: u8,
    pub capabilities: ProviderCapabilities,
    pub circuit: CircuitSnapshot,
}

pub struct ProviderRegistry {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    rate_limiter: RateLimiter,
    circuit_breaker: CircuitBreaker,
    backoff: BackoffPolicy,
}

impl ProviderRegistry {
    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self::with_config(providers, CircuitBreaker::new(), BackoffPolicy::default())
    }

    /// Build a registry with a custom breaker and backoff policy. Rate limits
    /// come from each provider's own [`MarketDataProvider::rate_limit`].
    pub fn with_config(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        circuit_breaker: CircuitBreaker,
        backoff: BackoffPolicy,
    ) -> Self {
        let rate_limiter = RateLimiter::new();
        for provider in &providers {
            rate_limiter.configure(provider.id(), provider.rate_limit());
        }
        info!(
            "Provider registry ready: [{}]",
            providers.iter().map(|p| p.id()).collect::<Vec<_>>().join(", ")
        );

        Self {
            providers,
            rate_limiter,
            circuit_breaker,
            backoff,
        }
    }

    pub fn providers(&self) -> &[Arc<dyn MarketDataProvider>] {
        &self.providers
    }

    pub fn provider_infos(&self) -> Vec<ProviderInfo> {
        self.providers
            .iter()
            .map(|p| ProviderInfo {
                id: p.id(),
                priority: p.priority(),
                capabilities: p.capabilities(),
                circuit: self.circuit_breaker.snapshot(p.id()),
            })
            .collect()
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    pub fn reset_circuit(&self, provider: &str) {
        self.circuit_breaker.reset(provider);
    }

    /// Capable providers for `kind` (and `interval`, for series), best first.
    fn ordered(&self, kind: DataKind, interval: Option<Interval>) -> Vec<Arc<dyn MarketDataProvider>> {
        let mut providers: Vec<_> = self
            .providers
            .iter()
            .filter(|p| {
                let caps = p.capabilities();
                caps.supports(kind)
                    && interval.map_or(true, |i| caps.intervals.is_empty() || caps.intervals.contains(&i))
            })
            .cloned()
            .collect();
        providers.sort_by_key(|p| p.priority());
        providers
    }

    async fn fetch<T, F, Fut>(
        &self,
        kind: DataKind,
        interval: Option<Interval>,
        call: F,
    ) -> Result<Fetched<T>, MarketDataError>
    where
        T: Validate,
        F: Fn(Arc<dyn MarketDataProvider>) -> Fut,
        Fut: Future<Output = Result<T, MarketDataError>>,
    {
        let providers = self.ordered(kind, interval);
        if providers.is_empty() {
            warn!("No providers registered for {}", kind);
            return Err(MarketDataError::NoProvidersAvailable);
        }

        let mut last_error: Option<MarketDataError> = None;

        for provider in providers {
            let id = provider.id();

            if !self.circuit_breaker.is_allowed(id) {
                debug!("Skipping '{}' for {}: circuit open", id, kind);
                last_error.get_or_insert(MarketDataError::CircuitOpen {
                    provider: id.to_string(),
                });
                continue;
            }

            self.rate_limiter.acquire(id).await;

            let result = retry_with_backoff(&self.backoff, id, || call(Arc::clone(&provider))).await;

            let error = match result {
                Ok(data) => {
                    self.circuit_breaker.record_success(id);
                    match data.validate() {
                        Ok(data) => {
                            debug!("Fetched {} from '{}'", kind, id);
                            return Ok(Fetched { data, provider: id });
                        }
                        Err(e) => {
                            warn!("'{}' returned unusable {}: {}", id, kind, e);
                            last_error = Some(e);
                            continue;
                        }
                    }
                }
                Err(e) => e,
            };

            match error.retry_class() {
                RetryClass::Never => {
                    info!("'{}' failed {} terminally: {}", id, kind, error);
                    return Err(error);
                }
                RetryClass::WithBackoff | RetryClass::CircuitOpen => {
                    self.circuit_breaker.record_failure(id);
                    warn!("'{}' failed {} after retries: {}", id, kind, error);
                }
                RetryClass::NextProvider => {
                    info!("'{}' cannot serve {}: {}, trying next", id, kind, error);
                }
            }
            last_error = Some(error);
        }

        Err(last_error.unwrap_or(MarketDataError::AllProvidersFailed))
    }

    pub async fn fetch_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Fetched<Vec<Candle>>, MarketDataError> {
        self.fetch(DataKind::Candles, Some(interval), |p| async move {
            p.get_candles(symbol, interval, limit).await
        })
        .await
    }

    pub async fn fetch_ticker(&self, symbol: &str) -> Result<Fetched<Ticker>, MarketDataError> {
        self.fetch(DataKind::Ticker, None, |p| async move { p.get_ticker(symbol).await })
            .await
    }

    pub async fn fetch_funding_rates(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Fetched<Vec<FundingRatePoint>>, MarketDataError> {
        self.fetch(DataKind::FundingRate, Some(interval), |p| async move {
            p.get_funding_rates(symbol, interval, limit).await
        })
        .await
    }

    pub async fn fetch_open_interest(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Fetched<Vec<OpenInterestPoint>>, MarketDataError> {
        self.fetch(DataKind::OpenInterest, Some(interval), |p| async move {
            p.get_open_interest(symbol, interval, limit).await
        })
        .await
    }

    pub async fn fetch_liquidations(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Fetched<Vec<LiquidationPoint>>, MarketDataError> {
        self.fetch(DataKind::Liquidations, Some(interval), |p| async move {
            p.get_liquidations(symbol, interval, limit).await
        })
        .await
    }

    pub async fn fetch_long_short_ratio(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<Fetched<Vec<LongShortRatioPoint>>, MarketDataError> {
        self.fetch(DataKind::LongShortRatio, Some(interval), |p| async move {
            p.get_long_short_ratio(symbol, interval, limit).await
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::RateLimit;
    use crate::registry::CircuitBreakerConfig;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Scripted ticker provider: pops one outcome per call, then succeeds.
    struct MockProvider {
        id: &'static str,
        priority: u8,
        calls: AtomicUsize,
        script: Mutex<Vec<MarketDataError>>,
        price: f64,
    }

    impl MockProvider {
        fn new(id: &'static str, priority: u8, failures: Vec<MarketDataError>) -> Arc<Self> {
            Arc::new(Self {
                id,
                priority,
                calls: AtomicUsize::new(0),
                script: Mutex::new(failures),
                price: 100.0,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockProvider {
        fn id(&self) -> &'static str {
            self.id
        }

        fn priority(&self) -> u8 {
            self.priority
        }

        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities {
                data_kinds: &[DataKind::Ticker],
                intervals: &[],
                requires_api_key: false,
            }
        }

        fn rate_limit(&self) -> RateLimit {
            RateLimit {
                requests_per_minute: 6000,
                burst: 100,
                min_delay: Duration::ZERO,
            }
        }

        async fn get_ticker(&self, symbol: &str) -> Result<Ticker, MarketDataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = {
                let mut script = self.script.lock().unwrap();
                if script.is_empty() {
                    None
                } else {
                    Some(script.remove(0))
                }
            };
            match next {
                Some(e) => Err(e),
                None => Ok(Ticker {
                    symbol: symbol.to_string(),
                    price: self.price,
                    change_24h_pct: None,
                    volume_24h: None,
                    market_cap: None,
                    time: Utc::now(),
                    source: self.id.to_string(),
                }),
            }
        }
    }

    fn registry(providers: Vec<Arc<dyn MarketDataProvider>>) -> ProviderRegistry {
        ProviderRegistry::with_config(
            providers,
            CircuitBreaker::with_config(CircuitBreakerConfig {
                failure_threshold: 1,
                recovery_timeout: Duration::from_secs(60),
                half_open_successes: 2,
            }),
            BackoffPolicy {
                max_attempts: 2,
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
                multiplier: 2.0,
            },
        )
    }

    fn timeout(id: &str) -> MarketDataError {
        MarketDataError::Timeout {
            provider: id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_priority_order() {
        let first = MockProvider::new("FIRST", 1, vec![]);
        let second = MockProvider::new("SECOND", 2, vec![]);
        let reg = registry(vec![second.clone(), first.clone()]);

        let fetched = reg.fetch_ticker("BTC").await.unwrap();
        assert_eq!(fetched.provider, "FIRST");
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_on_same_provider() {
        let first = MockProvider::new("FIRST", 1, vec![timeout("FIRST")]);
        let second = MockProvider::new("SECOND", 2, vec![]);
        let reg = registry(vec![first.clone(), second.clone()]);

        let fetched = reg.fetch_ticker("BTC").await.unwrap();
        assert_eq!(fetched.provider, "FIRST");
        assert_eq!(first.calls(), 2);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_backoff_penalises_and_fails_over() {
        let first = MockProvider::new("FIRST", 1, vec![timeout("FIRST"), timeout("FIRST")]);
        let second = MockProvider::new("SECOND", 2, vec![]);
        let reg = registry(vec![first.clone(), second.clone()]);

        let fetched = reg.fetch_ticker("BTC").await.unwrap();
        assert_eq!(fetched.provider, "SECOND");
        assert_eq!(reg.circuit_breaker().state("FIRST"), crate::registry::CircuitState::Open);

        // Next request skips the open circuit entirely.
        reg.fetch_ticker("BTC").await.unwrap();
        assert_eq!(first.calls(), 2);
    }

    #[tokio::test]
    async fn test_next_provider_errors_do_not_penalise() {
        let first = MockProvider::new(
            "FIRST",
            1,
            vec![MarketDataError::MissingApiKey {
                provider: "FIRST".into(),
            }],
        );
        let second = MockProvider::new("SECOND", 2, vec![]);
        let reg = registry(vec![first.clone(), second.clone()]);

        let fetched = reg.fetch_ticker("BTC").await.unwrap();
        assert_eq!(fetched.provider, "SECOND");
        assert_eq!(first.calls(), 1);
        assert_eq!(reg.circuit_breaker().failure_count("FIRST"), 0);
    }

    #[tokio::test]
    async fn test_terminal_error_stops_immediately() {
        let first = MockProvider::new("FIRST", 1, vec![MarketDataError::SymbolNotFound("ZZZ".into())]);
        let second = MockProvider::new("SECOND", 2, vec![]);
        let reg = registry(vec![first.clone(), second.clone()]);

        let err = reg.fetch_ticker("ZZZ").await.unwrap_err();
        assert!(matches!(err, MarketDataError::SymbolNotFound(_)));
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_capable_provider() {
        let only = MockProvider::new("ONLY", 1, vec![]);
        let reg = registry(vec![only]);

        let err = reg.fetch_candles("BTC", Interval::H1, 10).await.unwrap_err();
        assert!(matches!(err, MarketDataError::NoProvidersAvailable));
    }

    #[tokio::test]
    async fn test_all_fail_returns_last_error() {
        let first = MockProvider::new(
            "FIRST",
            1,
            vec![MarketDataError::provider("FIRST", "boom")],
        );
        let second = MockProvider::new(
            "SECOND",
            2,
            vec![MarketDataError::provider("SECOND", "bang")],
        );
        let reg = registry(vec![first, second]);

        let err = reg.fetch_ticker("BTC").await.unwrap_err();
        assert_eq!(err.to_string(), "Provider error: SECOND - bang");
    }

    #[tokio::test]
    async fn test_open_circuits_only_reports_circuit_open() {
        let only = MockProvider::new("ONLY", 1, vec![]);
        let reg = registry(vec![only.clone()]);
        reg.circuit_breaker().record_failure("ONLY");

        let err = reg.fetch_ticker("BTC").await.unwrap_err();
        assert!(matches!(err, MarketDataError::CircuitOpen { .. }));
        assert_eq!(only.calls(), 0);

        reg.reset_circuit("ONLY");
        assert!(reg.fetch_ticker("BTC").await.is_ok());
    }

    #[tokio::test]
    async fn test_invalid_payload_fails_over() {
        let bad = Arc::new(MockProvider {
            id: "BAD",
            priority: 1,
            calls: AtomicUsize::new(0),
            script: Mutex::new(vec![]),
            price: -1.0,
        });
        let good = MockProvider::new("GOOD", 2, vec![]);
        let reg = registry(vec![bad, good]);

        let fetched = reg.fetch_ticker("BTC").await.unwrap();
        assert_eq!(fetched.provider, "GOOD");
    }

    #[test]
    fn test_provider_infos() {
        let reg = registry(vec![MockProvider::new("ONLY", 3, vec![])]);
        let infos = reg.provider_infos();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].priority, 3);
        assert_eq!(infos[0].circuit.state, crate::registry::CircuitState::Closed);
    }
}
