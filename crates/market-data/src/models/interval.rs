//! Candle/series resolution.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Bar resolution shared by candles and derivatives series.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[default]
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Interval {
    pub const ALL: [Interval; 8] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H4,
        Interval::D1,
        Interval::W1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::D1 => "1d",
            Interval::W1 => "1w",
        }
    }

    pub fn minutes(&self) -> u32 {
        match self {
            Interval::M1 => 1,
            Interval::M5 => 5,
            Interval::M15 => 15,
            Interval::M30 => 30,
            Interval::H1 => 60,
            Interval::H4 => 240,
            Interval::D1 => 1_440,
            Interval::W1 => 10_080,
        }
    }

    pub fn seconds(&self) -> i64 {
        i64::from(self.minutes()) * 60
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.seconds())
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = MarketDataError;

    /// Accepts the canonical form (`1h`) plus a few common spellings
    /// (`60`, `1H`, `1D`, `1W`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let interval = match trimmed {
            "1m" | "1" => Interval::M1,
            "5m" | "5" => Interval::M5,
            "15m" | "15" => Interval::M15,
            "30m" | "30" => Interval::M30,
            "1h" | "1H" | "60" => Interval::H1,
            "4h" | "4H" | "240" => Interval::H4,
            "1d" | "1D" | "D" | "1440" => Interval::D1,
            "1w" | "1W" | "W" | "10080" => Interval::W1,
            _ => return Err(MarketDataError::InvalidInterval(trimmed.to_string())),
        };
        Ok(interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_canonical_and_aliases() {
        assert_eq!("1h".parse::<Interval>().unwrap(), Interval::H1);
        assert_eq!("60".parse::<Interval>().unwrap(), Interval::H1);
        assert_eq!(" 4h ".parse::<Interval>().unwrap(), Interval::H4);
        assert_eq!("1D".parse::<Interval>().unwrap(), Interval::D1);
        assert!(matches!(
            "2h".parse::<Interval>(),
            Err(MarketDataError::InvalidInterval(_))
        ));
    }

    #[test]
    fn test_round_trips_through_display() {
        for interval in Interval::ALL {
            assert_eq!(interval.as_str().parse::<Interval>().unwrap(), interval);
        }
    }

    #[test]
    fn test_durations() {
        assert_eq!(Interval::M15.seconds(), 900);
        assert_eq!(Interval::W1.minutes(), 10_080);
        assert_eq!(Interval::H4.duration(), Duration::hours(4));
    }

    #[test]
    fn test_serde_uses_short_form() {
        let json = serde_json::to_string(&Interval::M5).unwrap();
        assert_eq!(json, "\"5m\"");
        let back: Interval = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(back, Interval::W1);
    }
}
