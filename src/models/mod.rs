//! Shared data models spanning the engine layers.

pub mod regime;
pub mod signal;

pub use regime::MarketRegime;
pub use signal::{
    AnalysisResult, ComponentScore, Direction, FallbackReason, MarketBias, RecommendedAction,
    TradeSignal,
};
