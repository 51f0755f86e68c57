use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

use cryptodash_ai::{Analysis, AnalysisContext, MAX_QUESTION_CHARS};
use cryptodash_core::Error as CoreError;
use cryptodash_market_data::{normalize_symbol, Interval};

use super::shared::{parse_interval, CachedJson};
use crate::{
    error::{ApiError, ApiResult},
    main_lib::{Analyst, AppState},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalysisRequest {
    pub symbol: String,
    /// Defaults to `1h`.
    pub interval: Option<String>,
    pub question: String,
}

/// `"analysis:<SYMBOL>:<interval>:<hash>"`, where the hash covers the
/// question with case and surrounding whitespace folded away.
pub fn analysis_cache_key(symbol: &str, interval: Interval, question: &str) -> String {
    let digest = Sha256::digest(question.trim().to_lowercase().as_bytes());
    let hash: String = digest[..8].iter().map(|b| format!("{:02x}", b)).collect();
    format!("analysis:{}:{}:{}", symbol, interval, hash)
}

/// Answer a question about one market from its latest technical and
/// derivatives readings. Answers are cached per question for the analysis TTL.
#[utoipa::path(
    post,
    path = "/api/v1/analysis",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Model answer with cache metadata"),
        (status = 400, body = crate::error::ErrorBody),
        (status = 502, body = crate::error::ErrorBody),
        (status = 503, description = "AI analysis is not configured", body = crate::error::ErrorBody)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalysisRequest>,
) -> ApiResult<CachedJson<Analysis>> {
    let analyst = state.analyst.clone().ok_or(ApiError::AiDisabled)?;

    let symbol = normalize_symbol(&request.symbol).map_err(CoreError::from)?;
    let interval = parse_interval(request.interval.as_deref())?;
    let question = request.question.trim().to_string();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ApiError::BadRequest(format!(
            "question longer than {} characters",
            MAX_QUESTION_CHARS
        )));
    }

    let key = analysis_cache_key(&symbol, interval, &question);
    let cached = state
        .cache
        .get_or_fetch(&key, state.cache_ttls.analysis, || {
            answer(&state, &analyst, symbol.clone(), interval, question.clone())
        })
        .await?;
    Ok(CachedJson(cached))
}

async fn answer(
    state: &AppState,
    analyst: &Analyst,
    symbol: String,
    interval: Interval,
    question: String,
) -> cryptodash_core::Result<(Analysis, String)> {
    let market = &state.market_service;
    let (indicators, ticker, derivatives) = futures::join!(
        market.indicators(&symbol, interval, None),
        market.ticker(&symbol),
        market.derivatives_context(&symbol, interval),
    );

    // Without candles there is nothing to analyse; the rest is best effort.
    let snapshot = indicators?.data.snapshot;
    let price = match ticker {
        Ok(ticker) => Some(ticker.data.price),
        Err(e) => {
            tracing::debug!("No ticker for {} analysis: {}", symbol, e);
            snapshot.as_ref().map(|s| s.close)
        }
    };

    let context = AnalysisContext {
        symbol,
        interval,
        question,
        price,
        snapshot,
        derivatives,
    };
    let analysis = analyst.analyze(&context).await?;
    let model = analysis.model.clone();
    Ok((analysis, model))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/analysis", post(analyze))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_folds_case_and_whitespace() {
        let a = analysis_cache_key("BTC", Interval::H4, "Is funding overheated?");
        let b = analysis_cache_key("BTC", Interval::H4, "  is FUNDING overheated? ");
        assert_eq!(a, b);
        assert!(a.starts_with("analysis:BTC:4h:"));
        assert_eq!(a.len(), "analysis:BTC:4h:".len() + 16);

        let other = analysis_cache_key("BTC", Interval::H4, "Where is support?");
        assert_ne!(a, other);
    }
}
