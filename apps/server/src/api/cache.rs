use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::ApiResult, main_lib::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResult {
    pub purged: usize,
}

#[utoipa::path(
    post,
    path = "/api/v1/cache/purge",
    responses((status = 200, body = PurgeResult))
)]
pub async fn purge_cache(State(state): State<Arc<AppState>>) -> ApiResult<Json<PurgeResult>> {
    let purged = state.market_service.purge_cache().await?;
    tracing::info!("Purged {} expired cache entries", purged);
    Ok(Json(PurgeResult { purged }))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/cache/purge", post(purge_cache))
}
