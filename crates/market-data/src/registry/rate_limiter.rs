//! Per-provider token buckets.
//!
//! A bucket holds up to `burst` tokens and refills at
//! `requests_per_minute / 60` tokens per second. Providers that were never
//! configured get [`RateLimit::default`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::provider::RateLimit;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    capacity: f64,
    /// Tokens per second.
    refill_rate: f64,
    min_delay: Duration,
    refilled_at: Instant,
    last_grant: Option<Instant>,
}

impl Bucket {
    fn new(limit: &RateLimit) -> Self {
        let capacity = f64::from(limit.burst.max(1));
        Self {
            tokens: capacity,
            capacity,
            refill_rate: f64::from(limit.requests_per_minute.max(1)) / 60.0,
            min_delay: limit.min_delay,
            refilled_at: Instant::now(),
            last_grant: None,
        }
    }

    fn refill(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.refilled_at).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.refilled_at = now;
    }

    /// Take a token, or report how long until one is available.
    fn take(&mut self, now: Instant) -> Result<(), Duration> {
        self.refill(now);

        let spacing = self
            .last_grant
            .map(|at| self.min_delay.saturating_sub(now.saturating_duration_since(at)))
            .unwrap_or(Duration::ZERO);

        if self.tokens >= 1.0 && spacing.is_zero() {
            self.tokens -= 1.0;
            self.last_grant = Some(now);
            return Ok(());
        }

        let refill_wait = if self.tokens >= 1.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64((1.0 - self.tokens) / self.refill_rate)
        };
        Err(refill_wait.max(spacing))
    }
}

/// Thread-safe token-bucket limiter keyed by provider id.
pub struct RateLimiter {
    limits: Mutex<HashMap<String, RateLimit>>,
    buckets: Mutex<HashMap<String, Bucket>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            limits: Mutex::new(HashMap::new()),
            buckets: Mutex::new(HashMap::new()),
        }
    }

    // A poisoned lock only means a panic mid-update; the counters are still usable.
    fn buckets(&self) -> MutexGuard<'_, HashMap<String, Bucket>> {
        self.buckets.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter bucket lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn limits(&self) -> MutexGuard<'_, HashMap<String, RateLimit>> {
        self.limits.lock().unwrap_or_else(|poisoned| {
            warn!("Rate limiter config lock poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Set the limit for `provider` and start it with a full bucket.
    pub fn configure(&self, provider: &str, limit: RateLimit) {
        self.limits().insert(provider.to_string(), limit);
        self.buckets().remove(provider);
    }

    fn limit_for(&self, provider: &str) -> RateLimit {
        self.limits().get(provider).cloned().unwrap_or_default()
    }

    fn with_bucket<R>(&self, provider: &str, f: impl FnOnce(&mut Bucket) -> R) -> R {
        let limit = self.limit_for(provider);
        let mut buckets = self.buckets();
        let bucket = buckets
            .entry(provider.to_string())
            .or_insert_with(|| Bucket::new(&limit));
        f(bucket)
    }

    /// Wait until a token for `provider` is available, then take it.
    pub async fn acquire(&self, provider: &str) {
        loop {
            let wait = match self.with_bucket(provider, |b| b.take(Instant::now())) {
                Ok(()) => return,
                Err(wait) => wait,
            };
            debug!("Rate limiter: '{}' waiting {:?}", provider, wait);
            tokio::time::sleep(wait.max(Duration::from_millis(1))).await;
        }
    }

    /// Take a token if one is available right now.
    pub fn try_acquire(&self, provider: &str) -> bool {
        self.with_bucket(provider, |b| b.take(Instant::now()).is_ok())
    }

    pub fn remaining_tokens(&self, provider: &str) -> f64 {
        self.with_bucket(provider, |b| {
            b.refill(Instant::now());
            b.tokens
        })
    }

    /// Forget the bucket so the next call starts full.
    pub fn reset(&self, provider: &str) {
        self.buckets().remove(provider);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit(rpm: u32, burst: u32) -> RateLimit {
        RateLimit {
            requests_per_minute: rpm,
            burst,
            min_delay: Duration::ZERO,
        }
    }

    #[test]
    fn test_burst_then_empty() {
        let limiter = RateLimiter::new();
        limiter.configure("KRAKEN", limit(60, 3));

        assert!(limiter.try_acquire("KRAKEN"));
        assert!(limiter.try_acquire("KRAKEN"));
        assert!(limiter.try_acquire("KRAKEN"));
        assert!(!limiter.try_acquire("KRAKEN"));
    }

    #[test]
    fn test_bucket_refills_over_time() {
        let mut bucket = Bucket::new(&limit(60, 1));
        let start = Instant::now();

        assert!(bucket.take(start).is_ok());
        let wait = bucket.take(start).unwrap_err();
        assert!(wait > Duration::from_millis(900) && wait <= Duration::from_secs(1));

        assert!(bucket.take(start + Duration::from_secs(2)).is_ok());
    }

    #[test]
    fn test_min_delay_spaces_calls() {
        let mut bucket = Bucket::new(&RateLimit {
            requests_per_minute: 600,
            burst: 10,
            min_delay: Duration::from_millis(500),
        });
        let start = Instant::now();

        assert!(bucket.take(start).is_ok());
        let wait = bucket.take(start + Duration::from_millis(100)).unwrap_err();
        assert_eq!(wait, Duration::from_millis(400));
        assert!(bucket.take(start + Duration::from_millis(500)).is_ok());
    }

    #[test]
    fn test_providers_are_isolated() {
        let limiter = RateLimiter::new();
        limiter.configure("COINGLASS", limit(30, 1));

        assert!(limiter.try_acquire("COINGLASS"));
        assert!(!limiter.try_acquire("COINGLASS"));
        assert!(limiter.try_acquire("TATUM"));
    }

    #[test]
    fn test_reset_and_configure_refill_bucket() {
        let limiter = RateLimiter::new();
        limiter.configure("TATUM", limit(60, 2));
        limiter.try_acquire("TATUM");
        limiter.try_acquire("TATUM");
        assert!(limiter.remaining_tokens("TATUM") < 1.0);

        limiter.reset("TATUM");
        assert!((limiter.remaining_tokens("TATUM") - 2.0).abs() < 0.01);

        limiter.try_acquire("TATUM");
        limiter.configure("TATUM", limit(60, 5));
        assert!((limiter.remaining_tokens("TATUM") - 5.0).abs() < 0.01);
    }

    #[test]
    fn test_unconfigured_uses_default() {
        let limiter = RateLimiter::new();
        let expected = f64::from(RateLimit::default().burst);
        assert!((limiter.remaining_tokens("UNKNOWN") - expected).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_acquire_waits_for_refill() {
        let limiter = RateLimiter::new();
        limiter.configure("FAST", limit(6000, 1));

        limiter.acquire("FAST").await;
        let start = Instant::now();
        limiter.acquire("FAST").await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
