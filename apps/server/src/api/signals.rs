use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::ToSchema;

use cryptodash_core::signals::TradeSignal;

use super::shared::{parse_interval, parse_limit, require_symbol};
use crate::{error::ApiResult, main_lib::AppState};

const DEFAULT_SIGNAL_LIMIT: i64 = 50;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateSignalRequest {
    pub symbol: String,
    /// Defaults to `1h`.
    pub interval: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignalListQuery {
    pub symbol: Option<String>,
    pub limit: Option<String>,
}

/// Score the latest candles, ask the advisor when one is configured, and
/// persist the result.
#[utoipa::path(
    post,
    path = "/api/v1/signals/generate",
    request_body = GenerateSignalRequest,
    responses(
        (status = 200, description = "The stored trade signal"),
        (status = 400, body = crate::error::ErrorBody),
        (status = 503, body = crate::error::ErrorBody)
    )
)]
pub async fn generate_signal(
    State(state): State<Arc<AppState>>,
    Json(request): Json<GenerateSignalRequest>,
) -> ApiResult<Json<TradeSignal>> {
    let symbol = require_symbol(Some(request.symbol.as_str()))?;
    let interval = parse_interval(request.interval.as_deref())?;
    let signal = state.signal_service.generate(symbol, interval).await?;
    Ok(Json(signal))
}

#[utoipa::path(
    get,
    path = "/api/v1/signals",
    params(
        ("symbol" = Option<String>, Query, description = "Only signals for this asset"),
        ("limit" = Option<i64>, Query, description = "Maximum number of signals, newest first")
    ),
    responses((status = 200, description = "Recent trade signals"))
)]
pub async fn list_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignalListQuery>,
) -> ApiResult<Json<Vec<TradeSignal>>> {
    let symbol = query
        .symbol
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let limit = parse_limit(query.limit.as_deref())?
        .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
        .unwrap_or(DEFAULT_SIGNAL_LIMIT);
    let signals = state.signal_service.recent(symbol, limit)?;
    Ok(Json(signals))
}

#[utoipa::path(
    get,
    path = "/api/v1/signals/active",
    params(("symbol" = String, Query, description = "Base asset")),
    responses((status = 200, description = "Signals for the asset that have not expired"))
)]
pub async fn list_active_signals(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SignalListQuery>,
) -> ApiResult<Json<Vec<TradeSignal>>> {
    let symbol = require_symbol(query.symbol.as_deref())?;
    let signals = state.signal_service.active(symbol, Utc::now())?;
    Ok(Json(signals))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/signals", get(list_signals))
        .route("/signals/active", get(list_active_signals))
        .route("/signals/generate", post(generate_signal))
}
