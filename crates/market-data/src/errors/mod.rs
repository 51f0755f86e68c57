//! Error types and retry classification for the market data crate.
//!
//! - [`MarketDataError`]: every failure a provider or the registry can report
//! - [`RetryClass`]: what the registry should do about it

mod retry;

pub use retry::RetryClass;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while fetching market data.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider does not know this symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The symbol could not be normalised (empty, bad characters).
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The interval string is not one we understand, or the provider can't serve it.
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    /// The provider does not implement this operation.
    #[error("{operation} not supported by {provider}")]
    NotSupported {
        operation: String,
        provider: String,
    },

    /// The provider answered but returned no rows.
    #[error("No data returned by {provider}")]
    NoData { provider: String },

    /// HTTP 429 or an equivalent body-level code.
    #[error("Rate limited: {provider}")]
    RateLimited { provider: String },

    /// The upstream request timed out.
    #[error("Timeout: {provider}")]
    Timeout { provider: String },

    /// Any other provider-side failure.
    #[error("Provider error: {provider} - {message}")]
    ProviderError { provider: String, message: String },

    /// The provider needs an API key and none was configured.
    #[error("Missing API key for {provider}")]
    MissingApiKey { provider: String },

    /// The provider's circuit breaker is open.
    #[error("Circuit open: {provider}")]
    CircuitOpen { provider: String },

    /// Data came back but failed sanity checks.
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    /// No registered provider can serve this data kind.
    #[error("No providers available")]
    NoProvidersAvailable,

    /// Every capable provider was tried and none succeeded.
    #[error("All providers failed")]
    AllProvidersFailed,

    /// Transport-level failure talking to a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// ```
    /// use cryptodash_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "KRAKEN".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::SymbolNotFound("NOPE".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::SymbolNotFound(_)
            | Self::InvalidSymbol(_)
            | Self::InvalidInterval(_)
            | Self::ValidationFailed { .. }
            | Self::NoProvidersAvailable
            | Self::AllProvidersFailed => RetryClass::Never,

            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network(_) => {
                RetryClass::WithBackoff
            }

            Self::ProviderError { .. }
            | Self::NotSupported { .. }
            | Self::NoData { .. }
            | Self::MissingApiKey { .. } => RetryClass::NextProvider,

            Self::CircuitOpen { .. } => RetryClass::CircuitOpen,
        }
    }

    /// Map a non-success HTTP status from `provider` into an error.
    ///
    /// `detail` is the (possibly truncated) response body, kept for logs.
    pub fn from_status(provider: &str, status: StatusCode, detail: &str) -> Self {
        match status.as_u16() {
            429 => Self::RateLimited {
                provider: provider.to_string(),
            },
            408 | 504 => Self::Timeout {
                provider: provider.to_string(),
            },
            404 => Self::SymbolNotFound(detail.to_string()),
            401 | 403 => Self::ProviderError {
                provider: provider.to_string(),
                message: format!("unauthorized ({})", status.as_u16()),
            },
            code => Self::ProviderError {
                provider: provider.to_string(),
                message: format!("HTTP {}: {}", code, detail),
            },
        }
    }

    /// Classify a transport error, separating timeouts from other failures.
    pub fn from_transport(provider: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                provider: provider.to_string(),
            }
        } else {
            Self::Network(err)
        }
    }

    /// Shorthand for a provider-side error with a message.
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }
}
