//! Market data models.
//!
//! Prices and volumes are `f64`; these are display and signal inputs, never
//! ledger amounts.

mod candle;
mod derivatives;
mod interval;
mod symbol;
mod ticker;
mod types;

pub use candle::{closes, Candle};
pub use derivatives::{FundingRatePoint, LiquidationPoint, LongShortRatioPoint, OpenInterestPoint};
pub use interval::Interval;
pub use symbol::normalize_symbol;
pub use ticker::Ticker;
pub use types::{DataKind, ProviderId};
