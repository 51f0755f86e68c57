//! Indicator library.
//!
//! Pure functions over closes or candles. Series outputs are aligned to the
//! input, with `None` for warm-up bars.

mod divergence;
mod ichimoku;
mod macd;
mod moving_average;
mod pivots;
mod rsi;
mod series;
mod snapshot;

/// An indicator series aligned to its input.
pub type Series = Vec<Option<f64>>;

pub use divergence::{detect_divergence, find_swings, Divergence, DivergenceKind, Swing, SwingKind};
pub use ichimoku::{ichimoku, CloudPosition, Ichimoku, IchimokuParams};
pub use macd::{macd, Macd, MacdParams};
pub use moving_average::{ema, sma};
pub use pivots::PivotPoints;
pub use rsi::rsi;
pub use series::IndicatorSeries;
pub use snapshot::{IchimokuPoint, MacdPoint, TechnicalSnapshot, MIN_SNAPSHOT_CANDLES};
