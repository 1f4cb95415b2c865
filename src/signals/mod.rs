//! Adaptive weighted confidence engine and its building blocks.

pub mod aggregation;
pub mod cache;
pub mod categories;
pub mod engine;
pub mod scoring;
pub mod weights;

pub use aggregation::Aggregator;
pub use cache::{AnalysisCache, CacheState, StaleReason};
pub use categories::{MultiplierOverride, RegimeMultiplierTable, RegimeWeights};
pub use engine::{AdaptiveWeightedConfidenceEngine, CycleOutcome, EngineSettings};
pub use scoring::*;
pub use weights::{DegenerateStage, WeightDistributor, TOTAL_WEIGHT};
