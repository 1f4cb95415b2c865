//! Unit tests for confidence aggregation

use awce::models::{ComponentScore, Direction, MarketBias, RecommendedAction, TradeSignal};
use awce::signals::aggregation::Aggregator;

fn component(name: &str, normalized: f64, weight: f64) -> ComponentScore {
    ComponentScore {
        name: name.to_string(),
        primitive: None,
        raw_score: normalized,
        normalized_score: normalized,
        base_weight: weight,
        adjusted_weight: weight,
        weighted_contribution: normalized * weight / 100.0,
        rank: 0,
        substituted: false,
    }
}

fn uniform(scores: &[f64]) -> Vec<ComponentScore> {
    let weight = 100.0 / scores.len() as f64;
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| component(&format!("c{}", i), *s, weight))
        .collect()
}

#[test]
fn test_total_confidence_is_weighted_sum() {
    let components = vec![component("a", 90.0, 60.0), component("b", 10.0, 40.0)];
    assert!((Aggregator::total_confidence(&components) - 58.0).abs() < 1e-9);
}

#[test]
fn test_weighted_average_without_weight_is_neutral() {
    assert_eq!(Aggregator::weighted_average(&[]), 50.0);
    assert_eq!(
        Aggregator::weighted_average(&[component("a", 90.0, 0.0)]),
        50.0
    );
}

#[test]
fn test_bias_categories_and_strength() {
    assert_eq!(Aggregator::bias(80.0), (MarketBias::StrongBullish, 60.0));
    assert_eq!(Aggregator::bias(60.0).0, MarketBias::Bullish);
    assert_eq!(Aggregator::bias(50.0), (MarketBias::Neutral, 0.0));
    assert_eq!(Aggregator::bias(40.0).0, MarketBias::Bearish);
    assert_eq!(Aggregator::bias(10.0), (MarketBias::StrongBearish, 80.0));
}

#[test]
fn test_directional_mass() {
    let components = vec![
        component("bull", 80.0, 50.0),
        component("bear", 20.0, 30.0),
        component("flat", 50.0, 20.0),
    ];
    let (bullish, bearish) = Aggregator::directional_mass(&components);
    assert!((bullish - 40.0).abs() < 1e-9);
    assert!((bearish - 6.0).abs() < 1e-9);
}

#[test]
fn test_signal_requires_minimum_confidence() {
    assert_eq!(Aggregator::signal(49.9, 90.0, 0.0), TradeSignal::Neutral);
    assert_eq!(Aggregator::signal(50.0, 61.0, 0.0), TradeSignal::StrongBuy);
}

#[test]
fn test_signal_strength_tiers() {
    assert_eq!(Aggregator::signal(70.0, 61.0, 5.0), TradeSignal::StrongBuy);
    assert_eq!(Aggregator::signal(70.0, 50.0, 5.0), TradeSignal::Buy);
    assert_eq!(Aggregator::signal(70.0, 30.0, 10.0), TradeSignal::Neutral);
    assert_eq!(Aggregator::signal(70.0, 5.0, 65.0), TradeSignal::StrongSell);
    assert_eq!(Aggregator::signal(70.0, 5.0, 45.0), TradeSignal::Sell);
    assert_eq!(Aggregator::signal(70.0, 45.0, 45.0), TradeSignal::Neutral);
}

#[test]
fn test_confluence_boundaries() {
    // Fewer than two components is trivially confluent
    assert!(Aggregator::is_confluent(&[]));
    assert!(Aggregator::is_confluent(&uniform(&[50.0])));

    // Two available: both must agree
    assert!(Aggregator::is_confluent(&uniform(&[70.0, 80.0])));
    assert!(!Aggregator::is_confluent(&uniform(&[90.0, 10.0])));
    assert!(!Aggregator::is_confluent(&uniform(&[90.0, 50.0])));

    // Three available: two suffice
    assert!(Aggregator::is_confluent(&uniform(&[70.0, 80.0, 10.0])));
    assert!(!Aggregator::is_confluent(&uniform(&[70.0, 50.0, 10.0])));

    // Five available: three needed
    assert!(Aggregator::is_confluent(&uniform(&[20.0, 30.0, 10.0, 90.0, 50.0])));
    assert!(!Aggregator::is_confluent(&uniform(&[20.0, 30.0, 90.0, 80.0, 50.0])));
}

#[test]
fn test_confluence_thresholds_are_exclusive() {
    assert!(!Aggregator::is_confluent(&uniform(&[60.0, 60.0])));
    assert!(!Aggregator::is_confluent(&uniform(&[40.0, 40.0])));
}

#[test]
fn test_divergence() {
    assert_eq!(Aggregator::divergence(&uniform(&[70.0])), 0.0);
    assert_eq!(Aggregator::divergence(&uniform(&[90.0, 10.0, 50.0])), 80.0);
}

#[test]
fn test_recommended_action_bands() {
    assert_eq!(
        Aggregator::recommended_action(85.0, true, TradeSignal::StrongBuy),
        RecommendedAction::StrongEntry(Direction::Long)
    );
    assert_eq!(
        Aggregator::recommended_action(85.0, false, TradeSignal::StrongSell),
        RecommendedAction::CautiousEntry(Direction::Short)
    );
    assert_eq!(
        Aggregator::recommended_action(85.0, true, TradeSignal::Buy),
        RecommendedAction::CautiousEntry(Direction::Long)
    );
    assert_eq!(
        Aggregator::recommended_action(65.0, true, TradeSignal::Sell),
        RecommendedAction::CautiousEntry(Direction::Short)
    );
    assert_eq!(
        Aggregator::recommended_action(85.0, true, TradeSignal::Neutral),
        RecommendedAction::Monitor
    );
    assert_eq!(
        Aggregator::recommended_action(55.0, true, TradeSignal::Buy),
        RecommendedAction::Monitor
    );
    assert_eq!(
        Aggregator::recommended_action(30.0, true, TradeSignal::Neutral),
        RecommendedAction::Wait
    );
}

#[test]
fn test_aggregate_builds_full_result() {
    let timestamp = chrono::Utc::now();
    let result = Aggregator::aggregate(
        "BTC-PERP",
        uniform(&[80.0, 90.0]),
        awce::models::MarketRegime::Trending,
        None,
        timestamp,
    );
    assert_eq!(result.symbol, "BTC-PERP");
    assert!((result.total_confidence - 85.0).abs() < 1e-9);
    assert_eq!(result.bias, MarketBias::StrongBullish);
    assert_eq!(result.signal, TradeSignal::StrongBuy);
    assert!(result.is_confluent);
    assert_eq!(result.divergence_score, 10.0);
    assert_eq!(
        result.recommended_action,
        RecommendedAction::StrongEntry(Direction::Long)
    );
    assert_eq!(result.timestamp, timestamp);
    assert!(result.fallback.is_none());
}
