//! Test utilities for API server integration tests

use awce::config::EngineConfig;
use awce::core::clock::SystemClock;
use awce::core::http::{create_router, AppState, HealthStatus};
use awce::core::runtime::EngineHub;
use awce::logging::NullLogSink;
use awce::metrics::Metrics;
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;

/// Test helper for API server integration tests
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub hub: Arc<EngineHub>,
}

impl TestApiServer {
    pub async fn new() -> Self {
        Self::with_config(EngineConfig::default()).await
    }

    pub async fn with_config(config: EngineConfig) -> Self {
        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let hub = Arc::new(
            EngineHub::new(config, Arc::new(SystemClock), Arc::new(NullLogSink))
                .expect("engine hub")
                .with_metrics(metrics.clone()),
        );
        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            hub: hub.clone(),
        };

        let app = create_router(state);
        let server = TestServer::new(app).expect("start test server");

        Self {
            server,
            metrics,
            hub,
        }
    }
}
