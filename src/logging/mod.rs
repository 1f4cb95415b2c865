//! Logging initialization with environment-based formatters
//!
//! - Production: Structured JSON logs for cloud monitoring
//! - Sandbox: Colorful, human-readable logs for development
//!
//! Engine diagnostics flow through a [`LogSink`] so the engine runs the same
//! with or without a subscriber installed.

use crate::config::get_environment;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging based on the environment
///
/// - Production: JSON structured logs (suitable for log aggregation systems)
/// - Sandbox/Development: Colorful, human-readable logs
pub fn init_logging() {
    let env = get_environment();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let is_production = matches!(env.as_str(), "production" | "prod");

    if is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .init();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

/// Fire-and-forget diagnostic sink
pub trait LogSink: Send + Sync {
    fn log(&self, symbol: &str, severity: Severity, source: &str, message: &str);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn log(&self, _symbol: &str, _severity: Severity, _source: &str, _message: &str) {}
}

/// Forwards to the installed `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, symbol: &str, severity: Severity, source: &str, message: &str) {
        match severity {
            Severity::Debug => tracing::debug!(symbol = %symbol, source = %source, "{}", message),
            Severity::Info => tracing::info!(symbol = %symbol, source = %source, "{}", message),
            Severity::Warning => tracing::warn!(symbol = %symbol, source = %source, "{}", message),
            Severity::Error => tracing::error!(symbol = %symbol, source = %source, "{}", message),
        }
    }
}

/// Lets a keyed warning through at most once per interval
#[derive(Debug, Clone)]
pub struct WarningThrottle {
    interval: Duration,
    last_emitted: HashMap<String, DateTime<Utc>>,
}

impl WarningThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emitted: HashMap::new(),
        }
    }

    /// Returns `true` when the warning for `key` should be emitted now
    pub fn allow(&mut self, key: &str, now: DateTime<Utc>) -> bool {
        match self.last_emitted.get(key) {
            Some(last) if now - *last < self.interval => false,
            _ => {
                self.last_emitted.insert(key.to_string(), now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last_emitted.clear();
    }
}
