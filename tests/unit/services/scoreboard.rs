//! Unit tests for the score board and regime detector adapters

use awce::components::Primitive;
use awce::core::clock::ManualClock;
use awce::models::MarketRegime;
use awce::services::scorer::{
    CachedRegimeDetector, RegimeDetector, ScorerError, ScorerProvider,
};
use awce::services::ScoreBoard;
use chrono::Duration;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn board(clock: &Arc<ManualClock>) -> ScoreBoard {
    ScoreBoard::new(Duration::seconds(120), clock.clone())
}

#[test]
fn test_publish_and_latest() {
    let clock = Arc::new(ManualClock::default());
    let board = board(&clock);
    board.publish("BTC-PERP", Primitive::Volume, 64.0);

    assert_eq!(board.latest("BTC-PERP", Primitive::Volume), Some(64.0));
    assert_eq!(board.latest("BTC-PERP", Primitive::Momentum), None);
    assert_eq!(board.latest("ETH-PERP", Primitive::Volume), None);
}

#[test]
fn test_scores_expire_after_max_age() {
    let clock = Arc::new(ManualClock::default());
    let board = board(&clock);
    board.publish_all(
        "BTC-PERP",
        [(Primitive::Volume, 64.0), (Primitive::Liquidity, 30.0)],
    );

    clock.advance(Duration::seconds(120));
    assert_eq!(board.latest("BTC-PERP", Primitive::Volume), Some(64.0));

    clock.advance(Duration::seconds(1));
    assert_eq!(board.latest("BTC-PERP", Primitive::Volume), None);
    assert_eq!(board.snapshot("BTC-PERP").len(), 2);
}

#[test]
fn test_board_scorer_reports_unavailable() {
    let clock = Arc::new(ManualClock::default());
    let board = board(&clock);
    let scorer = board.resolve(Primitive::OrderFlow).unwrap();

    assert!(matches!(
        scorer.score("BTC-PERP"),
        Err(ScorerError::Unavailable(_))
    ));
    board.publish("BTC-PERP", Primitive::OrderFlow, 71.0);
    assert_eq!(scorer.score("BTC-PERP").unwrap(), 71.0);
}

#[test]
fn test_board_regime_and_symbols() {
    let clock = Arc::new(ManualClock::default());
    let board = board(&clock);
    assert_eq!(board.detect("BTC-PERP"), MarketRegime::Unknown);

    board.set_regime("BTC-PERP", MarketRegime::Breakout);
    assert_eq!(board.detect("BTC-PERP"), MarketRegime::Breakout);

    board.publish("SOL-PERP", Primitive::Volume, 1.0);
    board.publish("BTC-PERP", Primitive::Volume, 1.0);
    assert_eq!(board.symbols(), vec!["BTC-PERP".to_string(), "SOL-PERP".to_string()]);

    board.clear("BTC-PERP");
    assert_eq!(board.detect("BTC-PERP"), MarketRegime::Unknown);
    assert_eq!(board.symbols(), vec!["SOL-PERP".to_string()]);
}

#[test]
fn test_cached_regime_detector() {
    let clock = Arc::new(ManualClock::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let detector = CachedRegimeDetector::new(
        move |_: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
            MarketRegime::Ranging
        },
        Duration::seconds(5),
        clock.clone(),
    );

    assert_eq!(detector.detect("BTC-PERP"), MarketRegime::Ranging);
    clock.advance(Duration::seconds(4));
    assert_eq!(detector.detect("BTC-PERP"), MarketRegime::Ranging);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    detector.detect("ETH-PERP");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    clock.advance(Duration::seconds(1));
    detector.detect("BTC-PERP");
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    detector.invalidate();
    detector.detect("BTC-PERP");
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}
