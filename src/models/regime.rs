//! Market regime classification consumed from the external regime detector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Current market condition, used as an opaque key into the multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    /// Strong directional movement
    Trending,
    /// Sideways consolidation
    Ranging,
    /// Range expansion out of consolidation
    Breakout,
    /// Exhaustion of the prior move
    Reversal,
    /// Rapid swings without direction
    HighVolatility,
    /// Undetermined, no reweighting
    #[default]
    Unknown,
}

impl MarketRegime {
    pub fn all() -> [MarketRegime; 6] {
        [
            MarketRegime::Trending,
            MarketRegime::Ranging,
            MarketRegime::Breakout,
            MarketRegime::Reversal,
            MarketRegime::HighVolatility,
            MarketRegime::Unknown,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MarketRegime::Trending => "trending",
            MarketRegime::Ranging => "ranging",
            MarketRegime::Breakout => "breakout",
            MarketRegime::Reversal => "reversal",
            MarketRegime::HighVolatility => "high_volatility",
            MarketRegime::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketRegime {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        MarketRegime::all()
            .into_iter()
            .find(|regime| regime.as_str() == key)
            .ok_or_else(|| format!("unknown regime '{}'", s))
    }
}
