//! AI error types.

use thiserror::Error;

use cryptodash_core::errors::SignalError;
use cryptodash_core::Error as CoreError;

#[derive(Debug, Error)]
pub enum AiError {
    /// Invalid input or request.
    #[error("{0}")]
    InvalidInput(String),

    /// No API key configured for the gateway.
    #[error("Missing API key for {0}")]
    MissingApiKey(String),

    /// Transport or gateway failure (from rig-core).
    #[error("Provider error: {0}")]
    Provider(String),

    /// The model answered, but not in the shape we asked for.
    #[error("Invalid model response: {0}")]
    InvalidResponse(String),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::Provider(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Stable code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            AiError::InvalidInput(_) => "INVALID_INPUT",
            AiError::MissingApiKey(_) => "MISSING_API_KEY",
            AiError::Provider(_) => "PROVIDER_ERROR",
            AiError::InvalidResponse(_) => "INVALID_RESPONSE",
            AiError::Core(_) => "CORE_ERROR",
            AiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// Advisor failures surface to the signal service as [`SignalError::Advisor`].
impl From<AiError> for CoreError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Core(inner) => inner,
            other => CoreError::Signal(SignalError::Advisor(format!("{} ({})", other, other.code()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AiError::provider("boom").code(), "PROVIDER_ERROR");
        assert_eq!(AiError::invalid_response("no json").code(), "INVALID_RESPONSE");
        assert_eq!(AiError::MissingApiKey("gateway".into()).code(), "MISSING_API_KEY");
    }

    #[test]
    fn test_converts_into_signal_error() {
        let core: CoreError = AiError::invalid_response("no json").into();
        match core {
            CoreError::Signal(SignalError::Advisor(msg)) => assert!(msg.contains("INVALID_RESPONSE")),
            other => panic!("unexpected {other:?}"),
        }
    }
}
