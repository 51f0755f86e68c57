//! Provider registry module.
//!
//! This module provides orchestration for market data providers, including:
//! - Provider registration and priority ordering
//! - Rate limiting per provider
//! - Retry with exponential backoff for transient failures
//! - Circuit breaking for fault tolerance
//! - Payload validation

mod backoff;
mod circuit_breaker;
mod rate_limiter;
mod registry;
mod validator;

pub use backoff::{retry_with_backoff, BackoffPolicy};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState};
pub use rate_limiter::RateLimiter;
pub use registry::{Fetched, ProviderInfo, ProviderRegistry};
pub use validator::{check_candle, Validate};
