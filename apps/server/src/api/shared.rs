use axum::{
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use cryptodash_core::cache::Cached;
use cryptodash_core::Error as CoreError;
use cryptodash_market_data::Interval;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_INTERVAL: Interval = Interval::H1;

pub static X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// `?symbol=&interval=&limit=` as sent by the dashboard. Everything is
/// optional at the extractor level so bad values come back as JSON errors.
#[derive(Debug, Default, Deserialize)]
pub struct SeriesQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub limit: Option<String>,
}

impl SeriesQuery {
    pub fn symbol(&self) -> ApiResult<&str> {
        require_symbol(self.symbol.as_deref())
    }

    pub fn interval(&self) -> ApiResult<Interval> {
        parse_interval(self.interval.as_deref())
    }

    pub fn limit(&self) -> ApiResult<Option<usize>> {
        parse_limit(self.limit.as_deref())
    }
}

pub fn require_symbol(raw: Option<&str>) -> ApiResult<&str> {
    match raw.map(str::trim) {
        Some(symbol) if !symbol.is_empty() => Ok(symbol),
        _ => Err(ApiError::BadRequest("symbol is required".to_string())),
    }
}

/// Missing means one hour.
pub fn parse_interval(raw: Option<&str>) -> ApiResult<Interval> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value.parse::<Interval>().map_err(|e| CoreError::from(e).into()),
        None => Ok(DEFAULT_INTERVAL),
    }
}

pub fn parse_limit(raw: Option<&str>) -> ApiResult<Option<usize>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("Invalid limit '{}'", value))),
        None => Ok(None),
    }
}

/// JSON body for a cached read plus the `x-cache` header.
pub struct CachedJson<T>(pub Cached<T>);

impl<T: Serialize> IntoResponse for CachedJson<T> {
    fn into_response(self) -> Response {
        let status = self.0.status;
        let mut response = Json(self.0).into_response();
        response
            .headers_mut()
            .insert(X_CACHE.clone(), HeaderValue::from_static(status.as_str()));
        response
    }
}
