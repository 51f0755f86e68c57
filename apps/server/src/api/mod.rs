use std::sync::Arc;

use axum::{http::HeaderValue, routing::get, Json, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;

use crate::{config::Config, main_lib::AppState};

pub mod analysis;
pub mod cache;
pub mod derivatives;
pub mod health;
pub mod indicators;
pub mod market;
pub mod shared;
pub mod signals;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        health::list_providers,
        market::get_candles,
        market::get_ticker,
        derivatives::get_funding_rate,
        derivatives::get_open_interest,
        derivatives::get_liquidations,
        derivatives::get_long_short_ratio,
        indicators::get_indicators,
        signals::generate_signal,
        signals::list_signals,
        signals::list_active_signals,
        analysis::analyze,
        cache::purge_cache
    ),
    components(schemas(
        crate::error::ErrorBody,
        signals::GenerateSignalRequest,
        analysis::AnalysisRequest,
        cache::PurgeResult
    )),
    tags((name = "cryptodash"))
)]
pub struct ApiDoc;

fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allow.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins = config
        .cors_allow
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {}", o);
                None
            }
        })
        .collect::<Vec<_>>();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn app_router(state: Arc<AppState>, config: &Config) -> Router {
    let openapi = ApiDoc::openapi();

    let api = Router::new()
        .merge(health::router())
        .merge(market::router())
        .merge(derivatives::router())
        .merge(indicators::router())
        .merge(signals::router())
        .merge(analysis::router())
        .merge(cache::router())
        .route("/openapi.json", get(|| async { Json(openapi) }));

    Router::new()
        .nest("/api/v1", api)
        .with_state(state)
        .layer(cors_layer(config))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TimeoutLayer::new(config.request_timeout))
        .layer(TraceLayer::new_for_http())
}
