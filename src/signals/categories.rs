//! Regime multiplier table

use crate::components::Primitive;
use crate::models::MarketRegime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Damping applied to primitives that lose relevance in a regime
pub const TRENDING_DAMPING: f64 = 0.8;
pub const RANGING_DAMPING: f64 = 0.7;
pub const BREAKOUT_DAMPING: f64 = 0.8;
pub const REVERSAL_DAMPING: f64 = 0.8;
pub const HIGH_VOLATILITY_DAMPING: f64 = 0.7;

struct Sensitivity {
    boosted: &'static [Primitive],
    dampened: &'static [Primitive],
    damping: f64,
}

fn sensitivity(regime: MarketRegime) -> Option<Sensitivity> {
    use Primitive::*;
    match regime {
        MarketRegime::Trending => Some(Sensitivity {
            boosted: &[TrendStrength, Momentum, MultiTimeframe],
            dampened: &[Liquidity, FairValueGap, Divergence],
            damping: TRENDING_DAMPING,
        }),
        MarketRegime::Ranging => Some(Sensitivity {
            boosted: &[Liquidity, OrderBlock, FairValueGap, Divergence],
            dampened: &[TrendStrength, Momentum],
            damping: RANGING_DAMPING,
        }),
        MarketRegime::Breakout => Some(Sensitivity {
            boosted: &[StructureBreak, Volume, OrderFlow, Volatility],
            dampened: &[OrderBlock],
            damping: BREAKOUT_DAMPING,
        }),
        MarketRegime::Reversal => Some(Sensitivity {
            boosted: &[Divergence, Liquidity, OrderBlock],
            dampened: &[TrendStrength, MultiTimeframe],
            damping: REVERSAL_DAMPING,
        }),
        MarketRegime::HighVolatility => Some(Sensitivity {
            boosted: &[Volatility, OrderFlow],
            dampened: &[TrendStrength, Momentum],
            damping: HIGH_VOLATILITY_DAMPING,
        }),
        MarketRegime::Unknown => None,
    }
}

/// Boost applied to the regime-sensitive primitives of each regime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeWeights {
    pub trending: f64,
    pub ranging: f64,
    pub breakout: f64,
    pub reversal: f64,
    pub high_volatility: f64,
}

impl Default for RegimeWeights {
    fn default() -> Self {
        Self {
            trending: 1.5,
            ranging: 1.3,
            breakout: 1.4,
            reversal: 1.2,
            high_volatility: 1.5,
        }
    }
}

impl RegimeWeights {
    /// All boosts set to 1.0
    pub fn neutral() -> Self {
        Self {
            trending: 1.0,
            ranging: 1.0,
            breakout: 1.0,
            reversal: 1.0,
            high_volatility: 1.0,
        }
    }

    pub fn boost(&self, regime: MarketRegime) -> f64 {
        match regime {
            MarketRegime::Trending => self.trending,
            MarketRegime::Ranging => self.ranging,
            MarketRegime::Breakout => self.breakout,
            MarketRegime::Reversal => self.reversal,
            MarketRegime::HighVolatility => self.high_volatility,
            MarketRegime::Unknown => 1.0,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for regime in MarketRegime::all() {
            let boost = self.boost(regime);
            if !boost.is_finite() || boost < 0.0 {
                return Err(format!("multiplier for {} must be >= 0, got {}", regime, boost));
            }
        }
        Ok(())
    }
}

/// Explicit entry replacing the table value for one regime and primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplierOverride {
    pub regime: MarketRegime,
    pub primitive: Primitive,
    pub multiplier: f64,
}

/// Lookup of `(regime, primitive) -> multiplier`, 1.0 when absent
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegimeMultiplierTable {
    table: HashMap<(MarketRegime, Primitive), f64>,
}

impl RegimeMultiplierTable {
    /// Table with no adjustment for any regime
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn from_weights(weights: &RegimeWeights, overrides: &[MultiplierOverride]) -> Self {
        let mut table = HashMap::new();
        for regime in MarketRegime::all() {
            let Some(sensitivity) = sensitivity(regime) else {
                continue;
            };
            let boost = weights.boost(regime);
            for primitive in sensitivity.boosted {
                table.insert((regime, *primitive), boost);
            }
            for primitive in sensitivity.dampened {
                table.insert((regime, *primitive), sensitivity.damping);
            }
        }
        for entry in overrides.iter().filter(|e| e.regime != MarketRegime::Unknown) {
            table.insert((entry.regime, entry.primitive), entry.multiplier);
        }
        Self { table }
    }

    /// Always 1.0 for [`MarketRegime::Unknown`]
    pub fn multiplier(&self, regime: MarketRegime, primitive: Primitive) -> f64 {
        if regime == MarketRegime::Unknown {
            return 1.0;
        }
        self.table.get(&(regime, primitive)).copied().unwrap_or(1.0)
    }

    /// Entries for [`MarketRegime::Unknown`] are ignored
    pub fn set(&mut self, regime: MarketRegime, primitive: Primitive, multiplier: f64) {
        if regime == MarketRegime::Unknown {
            return;
        }
        self.table.insert((regime, primitive), multiplier);
    }
}
