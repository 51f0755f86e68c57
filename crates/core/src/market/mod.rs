//! Cached market reads on top of the provider registry.

mod market_model;
mod market_service;
mod market_traits;

pub use market_model::{clamp_limit, IndicatorReport, DEFAULT_LIMIT, MAX_LIMIT};
pub use market_service::MarketService;
pub use market_traits::MarketServiceTrait;
