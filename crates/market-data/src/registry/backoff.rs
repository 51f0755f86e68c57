//! Retry with exponential backoff for transient provider failures.

use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::errors::{MarketDataError, RetryClass};

#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    /// Total attempts including the first call.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(4),
            multiplier: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// A policy that calls once and never sleeps.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.base_delay.as_secs_f64() * self.multiplier.powi(exp);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

/// Call `op` until it succeeds, fails with a non-`WithBackoff` error, or
/// attempts run out. Returns the last error in the latter two cases.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &BackoffPolicy,
    provider: &str,
    mut op: F,
) -> Result<T, MarketDataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketDataError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.retry_class() == RetryClass::WithBackoff && attempt < policy.max_attempts => {
                let delay = policy.delay_for(attempt);
                debug!(
                    "'{}' attempt {}/{} failed ({}), retrying in {:?}",
                    provider, attempt, policy.max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> BackoffPolicy {
        BackoffPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            multiplier: 2.0,
        }
    }

    #[test]
    fn test_delay_grows_and_caps() {
        let policy = BackoffPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for(2), Duration::from_millis(500));
        assert_eq!(policy.delay_for(3), Duration::from_secs(1));
        assert_eq!(policy.delay_for(6), Duration::from_secs(4));
        assert_eq!(policy.delay_for(100), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast(), "KRAKEN", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(MarketDataError::Timeout {
                    provider: "KRAKEN".into(),
                })
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&fast(), "KRAKEN", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketDataError::RateLimited {
                provider: "KRAKEN".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(MarketDataError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_return_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = retry_with_backoff(&fast(), "TATUM", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(MarketDataError::MissingApiKey {
                provider: "TATUM".into(),
            })
        })
        .await;

        assert!(matches!(result, Err(MarketDataError::MissingApiKey { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
