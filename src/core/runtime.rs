//! Per-symbol engine hub shared by the HTTP layer and the scheduler

use crate::components::{ComponentDescriptor, Primitive};
use crate::config::{parse_env, EngineConfig};
use crate::core::clock::Clock;
use crate::error::{ConfigError, EngineError};
use crate::logging::LogSink;
use crate::metrics::Metrics;
use crate::models::{AnalysisResult, MarketRegime};
use crate::services::scorer::CachedRegimeDetector;
use crate::services::ScoreBoard;
use crate::signals::engine::{AdaptiveWeightedConfidenceEngine, CycleOutcome};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::env;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for the analysis runtime
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub evaluation_interval_seconds: u64,
    pub symbols: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            evaluation_interval_seconds: 60,
            symbols: vec!["BTC-PERP".to_string()],
        }
    }
}

impl RuntimeConfig {
    /// `EVAL_INTERVAL_SECONDS` and comma separated `SYMBOLS`
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        if let Some(interval) = parse_env::<u64>("EVAL_INTERVAL_SECONDS")? {
            config.evaluation_interval_seconds = interval;
        }
        if let Ok(raw) = env::var("SYMBOLS") {
            let symbols = parse_symbols(&raw);
            if !symbols.is_empty() {
                config.symbols = symbols;
            }
        }
        Ok(config)
    }
}

pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Descriptor as exposed by `GET /api/components`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentStatus {
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub descriptor: ComponentDescriptor,
    pub available: bool,
}

pub type SharedEngine = Arc<Mutex<AdaptiveWeightedConfidenceEngine>>;

/// One engine per tracked symbol, all fed by the same score board.
///
/// Each engine sits behind its own mutex; instances never share mutable state.
/// Only the configured symbol and those added with [`EngineHub::with_symbols`]
/// are tracked, anything else is rejected with [`EngineError::UnknownSymbol`].
pub struct EngineHub {
    config: EngineConfig,
    tracked: BTreeSet<String>,
    descriptors: Vec<ComponentDescriptor>,
    board: ScoreBoard,
    regime_detector: Arc<CachedRegimeDetector<ScoreBoard>>,
    log_sink: Arc<dyn LogSink>,
    clock: Arc<dyn Clock>,
    metrics: Option<Arc<Metrics>>,
    engines: RwLock<HashMap<String, SharedEngine>>,
    availability: RwLock<HashMap<Primitive, bool>>,
}

impl EngineHub {
    pub fn new(
        config: EngineConfig,
        clock: Arc<dyn Clock>,
        log_sink: Arc<dyn LogSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let descriptors = config.descriptors()?;
        let board = ScoreBoard::new(config.score_max_age(), clock.clone());
        let regime_detector = Arc::new(CachedRegimeDetector::new(
            board.clone(),
            config.regime_cache_ttl(),
            clock.clone(),
        ));
        let tracked = BTreeSet::from([config.symbol.clone()]);
        Ok(Self {
            config,
            tracked,
            descriptors,
            board,
            regime_detector,
            log_sink,
            clock,
            metrics: None,
            engines: RwLock::new(HashMap::new()),
            availability: RwLock::new(HashMap::new()),
        })
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Track `symbols` in addition to the configured one
    pub fn with_symbols<I, S>(mut self, symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for symbol in symbols {
            let symbol = symbol.as_ref().trim();
            if !symbol.is_empty() {
                self.tracked.insert(symbol.to_string());
            }
        }
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &ScoreBoard {
        &self.board
    }

    /// Symbols the hub accepts, sorted
    pub fn tracked_symbols(&self) -> Vec<String> {
        self.tracked.iter().cloned().collect()
    }

    pub fn is_tracked(&self, symbol: &str) -> bool {
        self.tracked.contains(symbol)
    }

    fn ensure_tracked(&self, symbol: &str) -> Result<(), EngineError> {
        if self.is_tracked(symbol) {
            Ok(())
        } else {
            Err(EngineError::UnknownSymbol(symbol.to_string()))
        }
    }

    /// Symbols with a live engine, sorted
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.engines.read().keys().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Engine for a tracked `symbol`, built and initialized on first use
    pub fn engine_for(&self, symbol: &str) -> Result<SharedEngine, EngineError> {
        self.ensure_tracked(symbol)?;
        if let Some(engine) = self.engines.read().get(symbol) {
            return Ok(engine.clone());
        }

        let mut engines = self.engines.write();
        if let Some(engine) = engines.get(symbol) {
            return Ok(engine.clone());
        }
        let engine = Arc::new(Mutex::new(self.build_engine(symbol)?));
        engines.insert(symbol.to_string(), engine.clone());
        info!(symbol = %symbol, components = self.descriptors.len(), "EngineHub: engine created");
        Ok(engine)
    }

    fn build_engine(&self, symbol: &str) -> Result<AdaptiveWeightedConfidenceEngine, EngineError> {
        let mut engine = AdaptiveWeightedConfidenceEngine::new(self.config.settings())
            .with_clock(self.clock.clone())
            .with_regime_detector(self.regime_detector.clone());
        for descriptor in &self.descriptors {
            engine.register_descriptor(descriptor.clone());
        }
        for (primitive, available) in self.availability.read().iter() {
            engine.set_component_availability(primitive.as_str(), *available);
        }
        engine.initialize(
            Some(self.log_sink.clone()),
            Some(Arc::new(self.board.clone())),
            symbol,
            self.config.min_confidence_for_display,
        )?;
        Ok(engine)
    }

    pub fn analyze(
        &self,
        symbol: &str,
        force_refresh: bool,
    ) -> Result<(AnalysisResult, CycleOutcome), EngineError> {
        let engine = self.engine_for(symbol)?;
        let (result, outcome) = {
            let mut engine = engine.lock();
            let result = engine.analyze(symbol, force_refresh);
            (result, engine.last_outcome())
        };
        self.record(symbol, &result, outcome);
        Ok((result, outcome))
    }

    fn record(&self, symbol: &str, result: &AnalysisResult, outcome: CycleOutcome) {
        debug!(symbol = %symbol, outcome = ?outcome, confidence = result.total_confidence, "EngineHub: analysis");
        let Some(metrics) = &self.metrics else {
            return;
        };
        let label = match outcome {
            CycleOutcome::Uninitialized => "uninitialized",
            CycleOutcome::Cached => "cached",
            CycleOutcome::Computed(_) => "computed",
        };
        metrics.analyses_total.with_label_values(&[label]).inc();
        if outcome == CycleOutcome::Cached {
            metrics.cache_hits_total.inc();
        }
        metrics
            .confidence
            .with_label_values(&[symbol])
            .set(result.total_confidence);
    }

    /// Mark the cached result of `symbol` stale. `Ok(false)` if the symbol is
    /// tracked but no engine exists yet.
    pub fn invalidate(&self, symbol: &str) -> Result<bool, EngineError> {
        self.ensure_tracked(symbol)?;
        match self.engines.read().get(symbol) {
            Some(engine) => {
                engine.lock().invalidate_cache();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Store pushed scores (and regime) and make the symbol's engine recompute
    pub fn publish_scores(
        &self,
        symbol: &str,
        scores: Vec<(Primitive, f64)>,
        regime: Option<MarketRegime>,
    ) -> Result<(), EngineError> {
        self.ensure_tracked(symbol)?;
        self.board.publish_all(symbol, scores);
        if let Some(regime) = regime {
            self.board.set_regime(symbol, regime);
            self.regime_detector.invalidate();
        }
        self.invalidate(symbol)?;
        Ok(())
    }

    /// Toggle a configured component on every engine, including ones built later
    pub fn set_availability(&self, name: &str, available: bool) -> Result<(), EngineError> {
        let primitive: Primitive = name.parse()?;
        if !self.descriptors.iter().any(|d| d.primitive == primitive) {
            return Err(EngineError::ComponentNotRegistered(primitive.to_string()));
        }
        self.availability.write().insert(primitive, available);
        for engine in self.engines.read().values() {
            engine
                .lock()
                .set_component_availability(primitive.as_str(), available);
        }
        info!(component = %primitive, available, "EngineHub: availability changed");
        Ok(())
    }

    pub fn components(&self) -> Vec<ComponentStatus> {
        let availability = self.availability.read();
        self.descriptors
            .iter()
            .map(|descriptor| ComponentStatus {
                name: descriptor.primitive.to_string(),
                label: descriptor.primitive.label().to_string(),
                descriptor: descriptor.clone(),
                available: availability
                    .get(&descriptor.primitive)
                    .copied()
                    .unwrap_or(true),
            })
            .collect()
    }
}
