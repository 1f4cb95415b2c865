//! Confidence aggregation: total confidence, bias, signal, confluence, divergence

use crate::models::{
    AnalysisResult, ComponentScore, FallbackReason, MarketBias, MarketRegime, RecommendedAction,
    TradeSignal,
};
use crate::signals::scoring::{clamp_percent, NEUTRAL_SCORE};
use crate::signals::weights::WEIGHT_EPSILON;
use chrono::{DateTime, Utc};

/// Normalized score above which a component counts as bullish
pub const BULLISH_SCORE: f64 = 60.0;
/// Normalized score below which a component counts as bearish
pub const BEARISH_SCORE: f64 = 40.0;
/// No directional signal below this total confidence
pub const MIN_SIGNAL_CONFIDENCE: f64 = 50.0;
pub const STRONG_MASS: f64 = 60.0;
pub const WEAK_MASS: f64 = 40.0;

// Confluence needs side_count / available >= 3 / 5, compared in integers.
const CONFLUENCE_NUMERATOR: usize = 3;
const CONFLUENCE_DENOMINATOR: usize = 5;

pub struct Aggregator;

impl Aggregator {
    /// Σ(normalized × adjusted / 100), clamped to 0..=100
    pub fn total_confidence(components: &[ComponentScore]) -> f64 {
        clamp_percent(
            components
                .iter()
                .map(|c| c.normalized_score * c.adjusted_weight / 100.0)
                .sum(),
        )
    }

    /// Average of normalized scores weighted by adjusted weight
    pub fn weighted_average(components: &[ComponentScore]) -> f64 {
        let total_weight: f64 = components.iter().map(|c| c.adjusted_weight).sum();
        if total_weight <= WEIGHT_EPSILON {
            return NEUTRAL_SCORE;
        }
        let weighted: f64 = components
            .iter()
            .map(|c| c.normalized_score * c.adjusted_weight)
            .sum();
        clamp_percent(weighted / total_weight)
    }

    /// Bias category and its strength (0-100)
    pub fn bias(weighted_average: f64) -> (MarketBias, f64) {
        let strength = clamp_percent((weighted_average - 50.0).abs() * 2.0);
        (MarketBias::from_score(weighted_average), strength)
    }

    /// Bullish and bearish contribution mass, each relative to the total adjusted weight
    pub fn directional_mass(components: &[ComponentScore]) -> (f64, f64) {
        let total_weight: f64 = components.iter().map(|c| c.adjusted_weight).sum();
        if total_weight <= WEIGHT_EPSILON {
            return (0.0, 0.0);
        }
        let mut bullish = 0.0;
        let mut bearish = 0.0;
        for component in components {
            if component.normalized_score > BULLISH_SCORE {
                bullish += component.weighted_contribution;
            } else if component.normalized_score < BEARISH_SCORE {
                bearish += component.weighted_contribution;
            }
        }
        (
            clamp_percent(bullish / total_weight * 100.0),
            clamp_percent(bearish / total_weight * 100.0),
        )
    }

    pub fn signal(total_confidence: f64, bullish_mass: f64, bearish_mass: f64) -> TradeSignal {
        if total_confidence < MIN_SIGNAL_CONFIDENCE {
            return TradeSignal::Neutral;
        }
        if bullish_mass > bearish_mass {
            if bullish_mass > STRONG_MASS {
                TradeSignal::StrongBuy
            } else if bullish_mass > WEAK_MASS {
                TradeSignal::Buy
            } else {
                TradeSignal::Neutral
            }
        } else if bearish_mass > bullish_mass {
            if bearish_mass > STRONG_MASS {
                TradeSignal::StrongSell
            } else if bearish_mass > WEAK_MASS {
                TradeSignal::Sell
            } else {
                TradeSignal::Neutral
            }
        } else {
            TradeSignal::Neutral
        }
    }

    /// A supermajority (>= 60%) of components agree on one side.
    /// Trivially true with fewer than two components.
    pub fn is_confluent(components: &[ComponentScore]) -> bool {
        let available = components.len();
        if available < 2 {
            return true;
        }
        let bullish = components
            .iter()
            .filter(|c| c.normalized_score > BULLISH_SCORE)
            .count();
        let bearish = components
            .iter()
            .filter(|c| c.normalized_score < BEARISH_SCORE)
            .count();
        bullish.max(bearish) * CONFLUENCE_DENOMINATOR >= available * CONFLUENCE_NUMERATOR
    }

    /// Spread between strongest and weakest normalized score
    pub fn divergence(components: &[ComponentScore]) -> f64 {
        if components.len() < 2 {
            return 0.0;
        }
        let (min, max) = components.iter().fold(
            (f64::INFINITY, f64::NEG_INFINITY),
            |(min, max), c| (min.min(c.normalized_score), max.max(c.normalized_score)),
        );
        clamp_percent(max - min)
    }

    pub fn recommended_action(
        total_confidence: f64,
        is_confluent: bool,
        signal: TradeSignal,
    ) -> RecommendedAction {
        match signal.direction() {
            Some(direction) if total_confidence >= 80.0 && is_confluent && signal.is_strong() => {
                RecommendedAction::StrongEntry(direction)
            }
            Some(direction) if total_confidence >= 60.0 => {
                RecommendedAction::CautiousEntry(direction)
            }
            _ if total_confidence >= 40.0 => RecommendedAction::Monitor,
            _ => RecommendedAction::Wait,
        }
    }

    pub fn aggregate(
        symbol: &str,
        components: Vec<ComponentScore>,
        regime: MarketRegime,
        fallback: Option<FallbackReason>,
        timestamp: DateTime<Utc>,
    ) -> AnalysisResult {
        let total_confidence = Self::total_confidence(&components);
        let (bias, bias_strength) = Self::bias(Self::weighted_average(&components));
        let (bullish_mass, bearish_mass) = Self::directional_mass(&components);
        let signal = Self::signal(total_confidence, bullish_mass, bearish_mass);
        let is_confluent = Self::is_confluent(&components);
        let divergence_score = Self::divergence(&components);
        let recommended_action = Self::recommended_action(total_confidence, is_confluent, signal);

        AnalysisResult {
            symbol: symbol.to_string(),
            components,
            total_confidence,
            regime,
            bias,
            bias_strength,
            signal,
            bullish_mass,
            bearish_mass,
            is_confluent,
            divergence_score,
            recommended_action,
            fallback,
            timestamp,
        }
    }
}
