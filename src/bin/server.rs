//! AWCE Confidence Server
//!
//! Starts the HTTP server and optionally runs periodic analysis for the
//! configured symbols.

use awce::config::{get_environment, parse_env, EngineConfig};
use awce::core::clock::SystemClock;
use awce::core::http::start_server;
use awce::core::runtime::{EngineHub, RuntimeConfig};
use awce::core::scheduler::AnalysisScheduler;
use awce::logging::{init_logging, TracingLogSink};
use awce::metrics::Metrics;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();
    init_logging();

    let port: u16 = parse_env("PORT")?.unwrap_or(8080);
    let engine_config = EngineConfig::load()?;
    let runtime_config = RuntimeConfig::from_env()?;

    let env = get_environment();
    info!(
        environment = %env,
        port,
        symbol = %engine_config.symbol,
        "Starting AWCE confidence server"
    );

    let metrics = Arc::new(Metrics::new()?);
    let hub = Arc::new(
        EngineHub::new(engine_config, Arc::new(SystemClock), Arc::new(TracingLogSink))?
            .with_symbols(&runtime_config.symbols)
            .with_metrics(metrics.clone()),
    );

    let server_hub = hub.clone();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, server_hub, metrics).await {
            error!(error = %e, "HTTP server error");
        }
    });

    let scheduler = if runtime_config.evaluation_interval_seconds > 0 {
        let scheduler = AnalysisScheduler::new(
            hub.clone(),
            runtime_config.symbols.clone(),
            runtime_config.evaluation_interval_seconds,
        )?;
        scheduler.start().await;
        info!(
            interval = runtime_config.evaluation_interval_seconds,
            symbols = %runtime_config.symbols.join(", "),
            "Periodic analysis enabled"
        );
        Some(scheduler)
    } else {
        info!("Periodic analysis disabled (set EVAL_INTERVAL_SECONDS to enable)");
        None
    };

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    if let Some(scheduler) = scheduler {
        scheduler.stop().await;
    }

    Ok(())
}
