use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};

use cryptodash_market_data::{
    FundingRatePoint, LiquidationPoint, LongShortRatioPoint, OpenInterestPoint,
};

use super::shared::{CachedJson, SeriesQuery};
use crate::{error::ApiResult, main_lib::AppState};

#[utoipa::path(
    get,
    path = "/api/v1/derivatives/funding-rate",
    params(
        ("symbol" = String, Query, description = "Base asset"),
        ("interval" = Option<String>, Query, description = "Series resolution"),
        ("limit" = Option<usize>, Query, description = "Number of points, 1 to 1000")
    ),
    responses(
        (status = 200, description = "Funding rates as fractions per funding period"),
        (status = 503, body = crate::error::ErrorBody)
    )
)]
pub async fn get_funding_rate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<Vec<FundingRatePoint>>> {
    let rates = state
        .market_service
        .funding_rates(query.symbol()?, query.interval()?, query.limit()?)
        .await?;
    Ok(CachedJson(rates))
}

#[utoipa::path(
    get,
    path = "/api/v1/derivatives/open-interest",
    params(
        ("symbol" = String, Query, description = "Base asset"),
        ("interval" = Option<String>, Query, description = "Series resolution"),
        ("limit" = Option<usize>, Query, description = "Number of points, 1 to 1000")
    ),
    responses(
        (status = 200, description = "Aggregated open interest in USD"),
        (status = 503, body = crate::error::ErrorBody)
    )
)]
pub async fn get_open_interest(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<Vec<OpenInterestPoint>>> {
    let points = state
        .market_service
        .open_interest(query.symbol()?, query.interval()?, query.limit()?)
        .await?;
    Ok(CachedJson(points))
}

#[utoipa::path(
    get,
    path = "/api/v1/derivatives/liquidations",
    params(
        ("symbol" = String, Query, description = "Base asset"),
        ("interval" = Option<String>, Query, description = "Series resolution"),
        ("limit" = Option<usize>, Query, description = "Number of points, 1 to 1000")
    ),
    responses(
        (status = 200, description = "Long and short liquidations in USD"),
        (status = 503, body = crate::error::ErrorBody)
    )
)]
pub async fn get_liquidations(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<Vec<LiquidationPoint>>> {
    let points = state
        .market_service
        .liquidations(query.symbol()?, query.interval()?, query.limit()?)
        .await?;
    Ok(CachedJson(points))
}

#[utoipa::path(
    get,
    path = "/api/v1/derivatives/long-short-ratio",
    params(
        ("symbol" = String, Query, description = "Base asset"),
        ("interval" = Option<String>, Query, description = "Series resolution"),
        ("limit" = Option<usize>, Query, description = "Number of points, 1 to 1000")
    ),
    responses(
        (status = 200, description = "Global long/short account ratio"),
        (status = 503, body = crate::error::ErrorBody)
    )
)]
pub async fn get_long_short_ratio(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<Vec<LongShortRatioPoint>>> {
    let points = state
        .market_service
        .long_short_ratio(query.symbol()?, query.interval()?, query.limit()?)
        .await?;
    Ok(CachedJson(points))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/derivatives/funding-rate", get(get_funding_rate))
        .route("/derivatives/open-interest", get(get_open_interest))
        .route("/derivatives/liquidations", get(get_liquidations))
        .route("/derivatives/long-short-ratio", get(get_long_short_ratio))
}
