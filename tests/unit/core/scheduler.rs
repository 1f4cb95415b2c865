//! Unit tests for the analysis scheduler

use awce::config::EngineConfig;
use awce::core::clock::SystemClock;
use awce::core::runtime::EngineHub;
use awce::core::scheduler::{interval_to_cron, AnalysisScheduler};
use awce::logging::NullLogSink;
use std::sync::Arc;

fn hub() -> Arc<EngineHub> {
    Arc::new(
        EngineHub::new(
            EngineConfig::default(),
            Arc::new(SystemClock),
            Arc::new(NullLogSink),
        )
        .unwrap()
        .with_symbols(["ETH-PERP"]),
    )
}

#[test]
fn test_interval_to_cron() {
    assert_eq!(interval_to_cron(5), "*/5 * * * * *");
    assert_eq!(interval_to_cron(30), "*/30 * * * * *");
    assert_eq!(interval_to_cron(60), "0 */1 * * * *");
    assert_eq!(interval_to_cron(300), "0 */5 * * * *");
}

#[test]
fn test_zero_interval_is_rejected() {
    assert!(AnalysisScheduler::new(hub(), vec!["BTC-PERP".to_string()], 0).is_err());
}

#[test]
fn test_run_once_analyzes_every_symbol() {
    let hub = hub();
    let symbols = vec!["BTC-PERP".to_string(), "ETH-PERP".to_string()];
    let scheduler = AnalysisScheduler::new(hub.clone(), symbols.clone(), 30).unwrap();

    assert_eq!(scheduler.symbols(), symbols.as_slice());
    assert_eq!(scheduler.run_once(), 2);
    assert_eq!(hub.symbols(), symbols);
}

#[tokio::test]
async fn test_start_and_stop() {
    let scheduler = AnalysisScheduler::new(hub(), vec!["BTC-PERP".to_string()], 30).unwrap();
    assert!(!scheduler.is_running().await);

    scheduler.start().await;
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
    assert!(!scheduler.is_running().await);
}
