//! Descriptor sets for the two analysis flavours the engine is deployed with

use crate::components::registry::{ComponentDescriptor, Primitive};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Structural read of price: trend, breaks, blocks, liquidity
    #[default]
    MarketStructure,
    /// Entry confirmation: timeframe alignment, momentum, flow
    TradeConfluence,
}

impl Preset {
    pub fn descriptors(&self) -> Vec<ComponentDescriptor> {
        match self {
            Preset::MarketStructure => vec![
                ComponentDescriptor::new(Primitive::TrendStrength, 25.0).required(),
                ComponentDescriptor::new(Primitive::StructureBreak, 20.0).required(),
                ComponentDescriptor::new(Primitive::OrderBlock, 20.0),
                ComponentDescriptor::new(Primitive::Liquidity, 15.0),
                ComponentDescriptor::new(Primitive::FairValueGap, 10.0),
                ComponentDescriptor::new(Primitive::Volume, 10.0),
            ],
            Preset::TradeConfluence => vec![
                ComponentDescriptor::new(Primitive::MultiTimeframe, 30.0).required(),
                ComponentDescriptor::new(Primitive::Momentum, 20.0),
                ComponentDescriptor::new(Primitive::OrderFlow, 20.0),
                ComponentDescriptor::new(Primitive::Divergence, 15.0),
                ComponentDescriptor::new(Primitive::Volatility, 15.0),
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::MarketStructure => "market_structure",
            Preset::TradeConfluence => "trade_confluence",
        }
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "market_structure" => Ok(Preset::MarketStructure),
            "trade_confluence" => Ok(Preset::TradeConfluence),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}
