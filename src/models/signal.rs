use crate::components::Primitive;
use crate::models::regime::MarketRegime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordinal directional bias derived from the weighted average score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketBias {
    StrongBullish,
    Bullish,
    #[default]
    Neutral,
    Bearish,
    StrongBearish,
}

impl MarketBias {
    /// Map a weighted average score (0-100) to a bias category
    pub fn from_score(score: f64) -> Self {
        if score > 70.0 {
            MarketBias::StrongBullish
        } else if score > 55.0 {
            MarketBias::Bullish
        } else if score > 45.0 {
            MarketBias::Neutral
        } else if score > 30.0 {
            MarketBias::Bearish
        } else {
            MarketBias::StrongBearish
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Long,
    Short,
}

/// Discrete trade signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSignal {
    StrongBuy,
    Buy,
    #[default]
    Neutral,
    Sell,
    StrongSell,
}

impl TradeSignal {
    pub fn direction(&self) -> Option<Direction> {
        match self {
            TradeSignal::StrongBuy | TradeSignal::Buy => Some(Direction::Long),
            TradeSignal::StrongSell | TradeSignal::Sell => Some(Direction::Short),
            TradeSignal::Neutral => None,
        }
    }

    pub fn is_strong(&self) -> bool {
        matches!(self, TradeSignal::StrongBuy | TradeSignal::StrongSell)
    }
}

/// Advisory derived from confidence, confluence and signal only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendedAction {
    StrongEntry(Direction),
    CautiousEntry(Direction),
    Monitor,
    Wait,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecommendedAction::StrongEntry(Direction::Long) => {
                f.write_str("Strong buy: high-confidence confluent setup")
            }
            RecommendedAction::StrongEntry(Direction::Short) => {
                f.write_str("Strong sell: high-confidence confluent setup")
            }
            RecommendedAction::CautiousEntry(Direction::Long) => {
                f.write_str("Consider buy with reduced size")
            }
            RecommendedAction::CautiousEntry(Direction::Short) => {
                f.write_str("Consider sell with reduced size")
            }
            RecommendedAction::Monitor => f.write_str("Monitor for confirmation"),
            RecommendedAction::Wait => f.write_str("Wait for better conditions"),
        }
    }
}

/// Why a cycle was answered by the synthetic neutral component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NoComponentsAvailable,
    DegenerateWeights,
}

/// Per-cycle score of a single primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub name: String,
    /// `None` for the synthetic neutral component
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitive: Option<Primitive>,
    pub raw_score: f64,
    pub normalized_score: f64,
    pub base_weight: f64,
    pub adjusted_weight: f64,
    pub weighted_contribution: f64,
    pub rank: u8,
    /// The scorer was unavailable and the neutral default was used
    #[serde(default)]
    pub substituted: bool,
}

impl ComponentScore {
    pub const NEUTRAL_NAME: &'static str = "neutral";

    pub fn synthetic_neutral(neutral_score: f64) -> Self {
        Self {
            name: Self::NEUTRAL_NAME.to_string(),
            primitive: None,
            raw_score: neutral_score,
            normalized_score: neutral_score,
            base_weight: 100.0,
            adjusted_weight: 100.0,
            weighted_contribution: neutral_score,
            rank: 0,
            substituted: true,
        }
    }
}

/// Result of one analysis cycle. Read-only once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: String,
    pub components: Vec<ComponentScore>,
    pub total_confidence: f64,
    pub regime: MarketRegime,
    pub bias: MarketBias,
    pub bias_strength: f64,
    pub signal: TradeSignal,
    pub bullish_mass: f64,
    pub bearish_mass: f64,
    pub is_confluent: bool,
    pub divergence_score: f64,
    pub recommended_action: RecommendedAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
    pub timestamp: DateTime<Utc>,
}

impl AnalysisResult {
    /// Safe defaults returned while the engine is not initialized
    pub fn uninitialized(symbol: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            symbol: symbol.into(),
            components: Vec::new(),
            total_confidence: 0.0,
            regime: MarketRegime::Unknown,
            bias: MarketBias::Neutral,
            bias_strength: 0.0,
            signal: TradeSignal::Neutral,
            bullish_mass: 0.0,
            bearish_mass: 0.0,
            is_confluent: false,
            divergence_score: 0.0,
            recommended_action: RecommendedAction::Wait,
            fallback: None,
            timestamp,
        }
    }

    /// Confidence at or above `min_confidence`, a directional signal and confluence
    pub fn is_signal_valid(&self, min_confidence: f64) -> bool {
        self.total_confidence >= min_confidence
            && self.signal != TradeSignal::Neutral
            && self.is_confluent
    }

    pub fn total_adjusted_weight(&self) -> f64 {
        self.components.iter().map(|c| c.adjusted_weight).sum()
    }

    pub fn component(&self, name: &str) -> Option<&ComponentScore> {
        self.components.iter().find(|c| c.name == name)
    }
}

impl fmt::Display for AnalysisResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | conf {:.1}% | {:?} ({:.0}) | {:?} | regime {} | confluent {} | div {:.1}",
            self.symbol,
            self.total_confidence,
            self.bias,
            self.bias_strength,
            self.signal,
            self.regime,
            self.is_confluent,
            self.divergence_score
        )?;
        for component in &self.components {
            write!(
                f,
                " | {} {:.0}@{:.1}%",
                component.name, component.normalized_score, component.adjusted_weight
            )?;
        }
        Ok(())
    }
}
