use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};

use cryptodash_core::market::IndicatorReport;

use super::shared::{CachedJson, SeriesQuery};
use crate::{error::ApiResult, main_lib::AppState};

/// EMA20/EMA50, RSI14, MACD and Ichimoku series plus the latest snapshot.
/// The snapshot is `null` when there are too few candles for every indicator.
#[utoipa::path(
    get,
    path = "/api/v1/indicators",
    params(
        ("symbol" = String, Query, description = "Base asset"),
        ("interval" = Option<String>, Query, description = "Candle resolution"),
        ("limit" = Option<usize>, Query, description = "Candles to compute over, 1 to 1000")
    ),
    responses(
        (status = 200, description = "Indicator series and snapshot"),
        (status = 400, body = crate::error::ErrorBody)
    )
)]
pub async fn get_indicators(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<IndicatorReport>> {
    let report = state
        .market_service
        .indicators(query.symbol()?, query.interval()?, query.limit()?)
        .await?;
    Ok(CachedJson(report))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/indicators", get(get_indicators))
}
