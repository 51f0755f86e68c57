use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider identifier - mostly static constants
pub type ProviderId = Cow<'static, str>;

/// The kinds of data a provider can serve.
///
/// Used for capability matching in the registry and as the first segment
/// of cache keys.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataKind {
    Candles,
    Ticker,
    FundingRate,
    OpenInterest,
    Liquidations,
    LongShortRatio,
}

impl DataKind {
    pub const ALL: [DataKind; 6] = [
        DataKind::Candles,
        DataKind::Ticker,
        DataKind::FundingRate,
        DataKind::OpenInterest,
        DataKind::Liquidations,
        DataKind::LongShortRatio,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DataKind::Candles => "candles",
            DataKind::Ticker => "ticker",
            DataKind::FundingRate => "funding_rate",
            DataKind::OpenInterest => "open_interest",
            DataKind::Liquidations => "liquidations",
            DataKind::LongShortRatio => "long_short_ratio",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
