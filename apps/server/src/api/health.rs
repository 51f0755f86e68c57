use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use cryptodash_market_data::ProviderInfo;

use crate::main_lib::AppState;

#[utoipa::path(get, path = "/api/v1/healthz", responses((status = 200, description = "Health")))]
pub async fn healthz() -> &'static str {
    "ok"
}

/// Registered providers in priority order, with capabilities and circuit state.
#[utoipa::path(
    get,
    path = "/api/v1/providers",
    responses((status = 200, description = "Provider diagnostics"))
)]
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderInfo>> {
    Json(state.market_service.providers())
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/providers", get(list_providers))
}
