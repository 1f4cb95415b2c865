//! In-memory board of the latest primitive scores per symbol.
//!
//! External analyzers push raw scores (and optionally a regime) over HTTP;
//! engines read them back through the `ScorerProvider` and `RegimeDetector`
//! interfaces. Scores older than `max_age` count as unavailable.

use crate::components::Primitive;
use crate::core::clock::Clock;
use crate::models::MarketRegime;
use crate::services::scorer::{PrimitiveScorer, RegimeDetector, ScorerError, ScorerProvider};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub value: f64,
    pub updated_at: DateTime<Utc>,
}

struct BoardInner {
    scores: RwLock<HashMap<String, HashMap<Primitive, ScoreEntry>>>,
    regimes: RwLock<HashMap<String, MarketRegime>>,
    max_age: Duration,
    clock: Arc<dyn Clock>,
}

#[derive(Clone)]
pub struct ScoreBoard {
    inner: Arc<BoardInner>,
}

impl ScoreBoard {
    pub fn new(max_age: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(BoardInner {
                scores: RwLock::new(HashMap::new()),
                regimes: RwLock::new(HashMap::new()),
                max_age,
                clock,
            }),
        }
    }

    pub fn publish(&self, symbol: &str, primitive: Primitive, value: f64) {
        let entry = ScoreEntry {
            value,
            updated_at: self.inner.clock.now(),
        };
        self.inner
            .scores
            .write()
            .entry(symbol.to_string())
            .or_default()
            .insert(primitive, entry);
    }

    pub fn publish_all(&self, symbol: &str, scores: impl IntoIterator<Item = (Primitive, f64)>) {
        let now = self.inner.clock.now();
        let mut board = self.inner.scores.write();
        let slot = board.entry(symbol.to_string()).or_default();
        for (primitive, value) in scores {
            slot.insert(
                primitive,
                ScoreEntry {
                    value,
                    updated_at: now,
                },
            );
        }
    }

    pub fn set_regime(&self, symbol: &str, regime: MarketRegime) {
        self.inner
            .regimes
            .write()
            .insert(symbol.to_string(), regime);
    }

    /// Latest score if it is younger than `max_age`
    pub fn latest(&self, symbol: &str, primitive: Primitive) -> Option<f64> {
        let now = self.inner.clock.now();
        let board = self.inner.scores.read();
        let entry = board.get(symbol)?.get(&primitive)?;
        (now - entry.updated_at <= self.inner.max_age).then_some(entry.value)
    }

    pub fn snapshot(&self, symbol: &str) -> HashMap<Primitive, ScoreEntry> {
        self.inner
            .scores
            .read()
            .get(symbol)
            .cloned()
            .unwrap_or_default()
    }

    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.inner.scores.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn clear(&self, symbol: &str) {
        self.inner.scores.write().remove(symbol);
        self.inner.regimes.write().remove(symbol);
    }
}

struct BoardScorer {
    board: ScoreBoard,
    primitive: Primitive,
}

impl PrimitiveScorer for BoardScorer {
    fn score(&self, symbol: &str) -> Result<f64, ScorerError> {
        self.board.latest(symbol, self.primitive).ok_or_else(|| {
            ScorerError::Unavailable(format!("no fresh {} score for {}", self.primitive, symbol))
        })
    }
}

impl ScorerProvider for ScoreBoard {
    fn resolve(&self, primitive: Primitive) -> Option<Arc<dyn PrimitiveScorer>> {
        Some(Arc::new(BoardScorer {
            board: self.clone(),
            primitive,
        }))
    }
}

impl RegimeDetector for ScoreBoard {
    fn detect(&self, symbol: &str) -> MarketRegime {
        self.inner
            .regimes
            .read()
            .get(symbol)
            .copied()
            .unwrap_or_default()
    }
}
