//! Primitive scorer and regime detector interfaces.

use crate::components::Primitive;
use crate::core::clock::Clock;
use crate::models::MarketRegime;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScorerError {
    #[error("Scorer unavailable: {0}")]
    Unavailable(String),

    #[error("Scorer returned an invalid value: {0}")]
    InvalidValue(f64),
}

/// Returns a raw score (nominally 0-100) for a symbol
pub trait PrimitiveScorer: Send + Sync {
    fn score(&self, symbol: &str) -> Result<f64, ScorerError>;
}

impl<F> PrimitiveScorer for F
where
    F: Fn(&str) -> Result<f64, ScorerError> + Send + Sync,
{
    fn score(&self, symbol: &str) -> Result<f64, ScorerError> {
        self(symbol)
    }
}

/// Scorer that always reports the same value
#[derive(Debug, Clone, Copy)]
pub struct FixedScore(pub f64);

impl PrimitiveScorer for FixedScore {
    fn score(&self, _symbol: &str) -> Result<f64, ScorerError> {
        Ok(self.0)
    }
}

/// Resolves a scorer capability for a primitive.
///
/// Resolution happens when a component is registered or the engine is
/// initialized, never inside the analysis cycle.
pub trait ScorerProvider: Send + Sync {
    fn resolve(&self, primitive: Primitive) -> Option<Arc<dyn PrimitiveScorer>>;
}

/// Map-backed provider
#[derive(Clone, Default)]
pub struct ScorerSet {
    scorers: HashMap<Primitive, Arc<dyn PrimitiveScorer>>,
}

impl ScorerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, primitive: Primitive, scorer: impl PrimitiveScorer + 'static) -> Self {
        self.insert(primitive, scorer);
        self
    }

    pub fn insert(&mut self, primitive: Primitive, scorer: impl PrimitiveScorer + 'static) {
        self.scorers.insert(primitive, Arc::new(scorer));
    }

    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }
}

impl ScorerProvider for ScorerSet {
    fn resolve(&self, primitive: Primitive) -> Option<Arc<dyn PrimitiveScorer>> {
        self.scorers.get(&primitive).cloned()
    }
}

/// Classifies the current market condition for a symbol
pub trait RegimeDetector: Send + Sync {
    fn detect(&self, symbol: &str) -> MarketRegime;
}

impl<F> RegimeDetector for F
where
    F: Fn(&str) -> MarketRegime + Send + Sync,
{
    fn detect(&self, symbol: &str) -> MarketRegime {
        self(symbol)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FixedRegime(pub MarketRegime);

impl RegimeDetector for FixedRegime {
    fn detect(&self, _symbol: &str) -> MarketRegime {
        self.0
    }
}

/// Wraps a detector with a short per-symbol cache
pub struct CachedRegimeDetector<D> {
    inner: D,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    cache: Mutex<HashMap<String, (MarketRegime, DateTime<Utc>)>>,
}

impl<D: RegimeDetector> CachedRegimeDetector<D> {
    pub fn new(inner: D, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner,
            ttl,
            clock,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn invalidate(&self) {
        self.cache.lock().clear();
    }
}

impl<D: RegimeDetector> RegimeDetector for CachedRegimeDetector<D> {
    fn detect(&self, symbol: &str) -> MarketRegime {
        let now = self.clock.now();
        let mut cache = self.cache.lock();
        if let Some((regime, detected_at)) = cache.get(symbol) {
            if now - *detected_at < self.ttl {
                return *regime;
            }
        }
        let regime = self.inner.detect(symbol);
        cache.insert(symbol.to_string(), (regime, now));
        regime
    }
}
