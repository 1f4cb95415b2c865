//! Adaptive Weighted Confidence Engine
//!
//! Combines the scores of independent primitive analyzers into one bounded
//! confidence value, a directional bias and a discrete trade signal.
//!
//! ```text
//! Registry → Regime Detector → Scorers → Normalizer → Weight Distributor
//!          → Confidence Aggregator → Analysis Cache
//! ```

pub mod components;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;

pub use components::{ComponentDescriptor, ComponentRegistry, Primitive};
pub use error::{ConfigError, EngineError};
pub use models::{AnalysisResult, ComponentScore, MarketBias, MarketRegime, TradeSignal};
pub use signals::engine::AdaptiveWeightedConfidenceEngine;
