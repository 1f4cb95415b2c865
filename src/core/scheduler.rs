//! Cron-based scheduler driving periodic analysis cycles

use crate::core::runtime::EngineHub;
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Convert an interval to a cron expression (second minute hour day month weekday)
pub fn interval_to_cron(interval_seconds: u64) -> String {
    if interval_seconds >= 60 {
        format!("0 */{} * * * *", interval_seconds / 60)
    } else {
        format!("*/{} * * * * *", interval_seconds)
    }
}

/// Scheduler that periodically runs `analyze(symbol, false)` for each symbol
pub struct AnalysisScheduler {
    hub: Arc<EngineHub>,
    symbols: Vec<String>,
    schedule: Schedule,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl AnalysisScheduler {
    /// # Arguments
    /// * `hub` - Engines to drive
    /// * `symbols` - List of symbols to analyze
    /// * `interval_seconds` - Analysis interval in seconds (0 = disabled)
    pub fn new(
        hub: Arc<EngineHub>,
        symbols: Vec<String>,
        interval_seconds: u64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        if interval_seconds == 0 {
            return Err("Scheduler disabled: interval_seconds is 0".into());
        }

        let cron_expr = interval_to_cron(interval_seconds);
        let schedule = Schedule::from_str(&cron_expr).map_err(|e| {
            Box::new(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("Invalid cron expression '{}': {}", cron_expr, e),
            )) as Box<dyn std::error::Error + Send + Sync>
        })?;

        info!(
            interval = interval_seconds,
            cron = %cron_expr,
            symbols = ?symbols,
            "AnalysisScheduler: created with interval {}s (cron: {})",
            interval_seconds,
            cron_expr
        );

        Ok(Self {
            hub,
            symbols,
            schedule,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// One pass over all symbols. Returns how many produced a result.
    pub fn run_once(&self) -> usize {
        run_cycle(&self.hub, &self.symbols)
    }

    pub async fn start(&self) {
        let hub = self.hub.clone();
        let symbols = self.symbols.clone();
        let schedule = self.schedule.clone();

        let handle = tokio::spawn(async move {
            info!("AnalysisScheduler: started, waiting for cron schedule...");

            loop {
                let mut upcoming = schedule.upcoming(chrono::Utc);
                if let Some(next_tick) = upcoming.next() {
                    let now = chrono::Utc::now();
                    if next_tick > now {
                        let duration = (next_tick - now).to_std().unwrap_or_default();
                        tokio::time::sleep(duration).await;
                    }
                } else {
                    tokio::time::sleep(tokio::time::Duration::from_secs(60)).await;
                    continue;
                }

                let analyzed = run_cycle(&hub, &symbols);
                debug!(
                    analyzed,
                    total = symbols.len(),
                    "AnalysisScheduler: cron tick complete"
                );
            }
        });

        *self.handle.write().await = Some(handle);
        info!("AnalysisScheduler: started successfully");
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("AnalysisScheduler: stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }
}

fn run_cycle(hub: &EngineHub, symbols: &[String]) -> usize {
    let mut analyzed = 0;
    for symbol in symbols {
        match hub.analyze(symbol, false) {
            Ok((result, _)) => {
                analyzed += 1;
                debug!(symbol = %symbol, confidence = result.total_confidence, signal = ?result.signal, "AnalysisScheduler: analyzed");
            }
            Err(e) => {
                error!(symbol = %symbol, error = %e, "AnalysisScheduler: analysis failed");
            }
        }
    }
    analyzed
}
