use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};

use cryptodash_market_data::{Candle, Ticker};

use super::shared::{CachedJson, SeriesQuery};
use crate::{error::ApiResult, main_lib::AppState};

#[utoipa::path(
    get,
    path = "/api/v1/market/candles",
    params(
        ("symbol" = String, Query, description = "Base asset or pair, e.g. BTC or btc/usd"),
        ("interval" = Option<String>, Query, description = "1m, 5m, 15m, 30m, 1h, 4h, 1d or 1w"),
        ("limit" = Option<usize>, Query, description = "Number of candles, 1 to 1000")
    ),
    responses(
        (status = 200, description = "OHLCV candles, oldest first"),
        (status = 400, body = crate::error::ErrorBody),
        (status = 503, body = crate::error::ErrorBody)
    )
)]
pub async fn get_candles(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<Vec<Candle>>> {
    let candles = state
        .market_service
        .candles(query.symbol()?, query.interval()?, query.limit()?)
        .await?;
    Ok(CachedJson(candles))
}

#[utoipa::path(
    get,
    path = "/api/v1/market/ticker",
    params(("symbol" = String, Query, description = "Base asset or pair")),
    responses(
        (status = 200, description = "Latest price and 24h stats"),
        (status = 404, body = crate::error::ErrorBody)
    )
)]
pub async fn get_ticker(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<CachedJson<Ticker>> {
    let ticker = state.market_service.ticker(query.symbol()?).await?;
    Ok(CachedJson(ticker))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market/candles", get(get_candles))
        .route("/market/ticker", get(get_ticker))
}
