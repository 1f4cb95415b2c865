//! Unit tests for the regime multiplier table

use awce::components::Primitive;
use awce::models::MarketRegime;
use awce::signals::categories::{MultiplierOverride, RegimeMultiplierTable, RegimeWeights};

#[test]
fn test_default_regime_weights() {
    let weights = RegimeWeights::default();
    assert_eq!(weights.trending, 1.5);
    assert_eq!(weights.ranging, 1.3);
    assert_eq!(weights.breakout, 1.4);
    assert_eq!(weights.reversal, 1.2);
    assert_eq!(weights.high_volatility, 1.5);
    assert_eq!(weights.boost(MarketRegime::Unknown), 1.0);
}

#[test]
fn test_table_boosts_and_dampens() {
    let table = RegimeMultiplierTable::from_weights(&RegimeWeights::default(), &[]);

    assert_eq!(table.multiplier(MarketRegime::Trending, Primitive::TrendStrength), 1.5);
    assert_eq!(table.multiplier(MarketRegime::Trending, Primitive::Liquidity), 0.8);
    assert_eq!(table.multiplier(MarketRegime::Trending, Primitive::OrderBlock), 1.0);

    assert_eq!(table.multiplier(MarketRegime::Ranging, Primitive::Liquidity), 1.3);
    assert_eq!(table.multiplier(MarketRegime::Ranging, Primitive::Momentum), 0.7);

    assert_eq!(table.multiplier(MarketRegime::Breakout, Primitive::Volume), 1.4);
    assert_eq!(table.multiplier(MarketRegime::Breakout, Primitive::OrderBlock), 0.8);

    assert_eq!(table.multiplier(MarketRegime::Reversal, Primitive::Divergence), 1.2);
    assert_eq!(table.multiplier(MarketRegime::Reversal, Primitive::MultiTimeframe), 0.8);

    assert_eq!(
        table.multiplier(MarketRegime::HighVolatility, Primitive::Volatility),
        1.5
    );
    assert_eq!(
        table.multiplier(MarketRegime::HighVolatility, Primitive::TrendStrength),
        0.7
    );
}

#[test]
fn test_unknown_regime_is_identity() {
    let table = RegimeMultiplierTable::from_weights(&RegimeWeights::default(), &[]);
    for primitive in Primitive::all() {
        assert_eq!(table.multiplier(MarketRegime::Unknown, primitive), 1.0);
    }
}

#[test]
fn test_identity_table() {
    let table = RegimeMultiplierTable::identity();
    for regime in MarketRegime::all() {
        for primitive in Primitive::all() {
            assert_eq!(table.multiplier(regime, primitive), 1.0);
        }
    }
}

#[test]
fn test_overrides_replace_table_entries() {
    let overrides = vec![MultiplierOverride {
        regime: MarketRegime::Trending,
        primitive: Primitive::Liquidity,
        multiplier: 2.0,
    }];
    let mut table = RegimeMultiplierTable::from_weights(&RegimeWeights::default(), &overrides);
    assert_eq!(table.multiplier(MarketRegime::Trending, Primitive::Liquidity), 2.0);

    table.set(MarketRegime::Ranging, Primitive::Volume, 0.5);
    assert_eq!(table.multiplier(MarketRegime::Ranging, Primitive::Volume), 0.5);
}

#[test]
fn test_unknown_regime_ignores_overrides() {
    let overrides = vec![MultiplierOverride {
        regime: MarketRegime::Unknown,
        primitive: Primitive::Volume,
        multiplier: 0.0,
    }];
    let mut table = RegimeMultiplierTable::from_weights(&RegimeWeights::default(), &overrides);
    assert_eq!(table.multiplier(MarketRegime::Unknown, Primitive::Volume), 1.0);

    table.set(MarketRegime::Unknown, Primitive::Volume, 0.5);
    assert_eq!(table.multiplier(MarketRegime::Unknown, Primitive::Volume), 1.0);
}

#[test]
fn test_regime_weights_validation() {
    assert!(RegimeWeights::default().validate().is_ok());
    assert!(RegimeWeights::neutral().validate().is_ok());

    let negative = RegimeWeights {
        ranging: -0.1,
        ..RegimeWeights::default()
    };
    assert!(negative.validate().is_err());

    let infinite = RegimeWeights {
        breakout: f64::INFINITY,
        ..RegimeWeights::default()
    };
    assert!(infinite.validate().is_err());
}
