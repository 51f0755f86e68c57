use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use cryptodash_ai::AiError;
use cryptodash_core::errors::{
    DatabaseError, Error as CoreError, IndicatorError, MarketDataError, SignalError,
};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Core(#[from] CoreError),
    #[error("{0}")]
    Ai(#[from] AiError),
    #[error("{0}")]
    BadRequest(String),
    #[error("AI analysis is not configured")]
    AiDisabled,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Core(e) => core_status(e),
            ApiError::Ai(e) => match e {
                AiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                AiError::MissingApiKey(_) => StatusCode::SERVICE_UNAVAILABLE,
                AiError::Provider(_) | AiError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
                AiError::Core(inner) => core_status(inner),
                AiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AiDisabled => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

fn core_status(error: &CoreError) -> StatusCode {
    match error {
        CoreError::MarketData(e) => market_data_status(e),
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Indicator(IndicatorError::InsufficientData { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        CoreError::Indicator(IndicatorError::InvalidPeriod { .. }) => StatusCode::BAD_REQUEST,
        CoreError::Signal(SignalError::Advisor(_)) => StatusCode::BAD_GATEWAY,
        CoreError::Signal(SignalError::AdvisorUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
        CoreError::Database(DatabaseError::NotFound(_)) => StatusCode::NOT_FOUND,
        CoreError::Database(_) | CoreError::Serialization(_) | CoreError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn market_data_status(error: &MarketDataError) -> StatusCode {
    match error {
        MarketDataError::InvalidSymbol(_) | MarketDataError::InvalidInterval(_) => {
            StatusCode::BAD_REQUEST
        }
        MarketDataError::SymbolNotFound(_) => StatusCode::NOT_FOUND,
        MarketDataError::NoProvidersAvailable
        | MarketDataError::AllProvidersFailed
        | MarketDataError::CircuitOpen { .. }
        | MarketDataError::NotSupported { .. }
        | MarketDataError::MissingApiKey { .. } => StatusCode::SERVICE_UNAVAILABLE,
        MarketDataError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        MarketDataError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        MarketDataError::ValidationFailed { .. }
        | MarketDataError::ProviderError { .. }
        | MarketDataError::NoData { .. }
        | MarketDataError::Network(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed with {}: {}", status.as_u16(), self);
        }
        let body = Json(ErrorBody {
            code: status.as_u16(),
            message: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(error: impl Into<ApiError>) -> u16 {
        error.into().status().as_u16()
    }

    #[test]
    fn test_market_data_errors_map_to_http_statuses() {
        let md = |e: MarketDataError| status_of(CoreError::from(e));

        assert_eq!(md(MarketDataError::InvalidSymbol("".into())), 400);
        assert_eq!(md(MarketDataError::InvalidInterval("7m".into())), 400);
        assert_eq!(md(MarketDataError::SymbolNotFound("NOPE".into())), 404);
        assert_eq!(md(MarketDataError::NoProvidersAvailable), 503);
        assert_eq!(md(MarketDataError::AllProvidersFailed), 503);
        assert_eq!(md(MarketDataError::CircuitOpen { provider: "KRAKEN".into() }), 503);
        assert_eq!(md(MarketDataError::RateLimited { provider: "KRAKEN".into() }), 429);
        assert_eq!(
            md(MarketDataError::ValidationFailed {
                message: "high < low".into()
            }),
            502
        );
        assert_eq!(md(MarketDataError::provider("CMC", "HTTP 500")), 502);
    }

    #[test]
    fn test_ai_and_local_errors() {
        assert_eq!(status_of(ApiError::AiDisabled), 503);
        assert_eq!(status_of(AiError::invalid_input("empty question")), 400);
        assert_eq!(status_of(AiError::provider("gateway down")), 502);
        assert_eq!(
            status_of(CoreError::Signal(SignalError::Advisor("bad json".into()))),
            502
        );
        assert_eq!(status_of(ApiError::BadRequest("symbol is required".into())), 400);
    }
}
