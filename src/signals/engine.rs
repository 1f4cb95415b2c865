//! Adaptive weighted confidence engine.
//!
//! Single-threaded and call-driven: every public operation runs to
//! completion. Callers sharing an instance across threads wrap it in one
//! mutex (see `core::runtime::EngineHub`).

use crate::components::{ComponentDescriptor, ComponentEntry, ComponentRegistry, Primitive};
use crate::core::clock::{Clock, SystemClock};
use crate::error::EngineError;
use crate::logging::{LogSink, NullLogSink, Severity, WarningThrottle};
use crate::models::{AnalysisResult, ComponentScore, FallbackReason, MarketBias, MarketRegime, TradeSignal};
use crate::services::scorer::{RegimeDetector, ScorerProvider};
use crate::signals::aggregation::Aggregator;
use crate::signals::cache::{AnalysisCache, StaleReason};
use crate::signals::categories::{RegimeMultiplierTable, RegimeWeights};
use crate::signals::scoring::{clamp_percent, confidence_label, normalize_score, NEUTRAL_SCORE};
use crate::signals::weights::{DegenerateStage, WeightDistributor};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const SOURCE: &str = "awce";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub cache_ttl: Duration,
    /// Cached results below this confidence are never served
    pub min_confidence_floor: f64,
    /// Computed results at or above this confidence are logged at info
    pub min_confidence_for_display: f64,
    pub warning_throttle: Duration,
    pub multipliers: RegimeMultiplierTable,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::seconds(3),
            min_confidence_floor: 10.0,
            min_confidence_for_display: 60.0,
            warning_throttle: Duration::seconds(60),
            multipliers: RegimeMultiplierTable::from_weights(&RegimeWeights::default(), &[]),
        }
    }
}

/// How the last `analyze` call was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Uninitialized,
    Cached,
    Computed(StaleReason),
}

pub struct AdaptiveWeightedConfidenceEngine {
    settings: EngineSettings,
    registry: ComponentRegistry,
    distributor: WeightDistributor,
    cache: AnalysisCache,
    log_sink: Arc<dyn LogSink>,
    scorers: Option<Arc<dyn ScorerProvider>>,
    regime_detector: Option<Arc<dyn RegimeDetector>>,
    clock: Arc<dyn Clock>,
    throttle: WarningThrottle,
    symbol: String,
    initialized: bool,
    last_scores: HashMap<Primitive, f64>,
    last_outcome: CycleOutcome,
}

impl AdaptiveWeightedConfidenceEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            distributor: WeightDistributor::new(settings.multipliers.clone()),
            cache: AnalysisCache::new(settings.cache_ttl, settings.min_confidence_floor),
            throttle: WarningThrottle::new(settings.warning_throttle),
            settings,
            registry: ComponentRegistry::new(),
            log_sink: Arc::new(NullLogSink),
            scorers: None,
            regime_detector: None,
            clock: Arc::new(SystemClock),
            symbol: String::new(),
            initialized: false,
            last_scores: HashMap::new(),
            last_outcome: CycleOutcome::Uninitialized,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_log_sink(mut self, log_sink: Arc<dyn LogSink>) -> Self {
        self.log_sink = log_sink;
        self
    }

    pub fn with_regime_detector(mut self, detector: Arc<dyn RegimeDetector>) -> Self {
        self.regime_detector = Some(detector);
        self
    }

    /// Bind collaborators and validate the registry.
    ///
    /// Fails when no registered component has a positive base weight.
    pub fn initialize(
        &mut self,
        log_sink: Option<Arc<dyn LogSink>>,
        scorers: Option<Arc<dyn ScorerProvider>>,
        symbol: &str,
        min_confidence_for_display: f64,
    ) -> Result<(), EngineError> {
        if let Some(log_sink) = log_sink {
            self.log_sink = log_sink;
        }
        if let Some(provider) = scorers {
            self.registry.resolve_scorers(provider.as_ref());
            self.scorers = Some(provider);
        }
        self.symbol = symbol.to_string();
        self.settings.min_confidence_for_display = clamp_percent(min_confidence_for_display);

        if !self.registry.has_weighted_component() {
            self.initialized = false;
            self.log(
                symbol,
                Severity::Error,
                "initialization failed: no component with a positive base weight",
            );
            return Err(EngineError::NoWeightedComponents);
        }

        let missing: Vec<String> = self
            .registry
            .entries()
            .iter()
            .filter(|e| e.descriptor.required && (!e.available || !e.has_scorer()))
            .map(|e| e.primitive().to_string())
            .collect();
        for name in missing {
            self.log(
                symbol,
                Severity::Warning,
                &format!("required component {} is unavailable or has no scorer", name),
            );
        }

        self.cache.clear();
        self.throttle.reset();
        self.last_scores.clear();
        self.initialized = true;
        self.log(
            symbol,
            Severity::Info,
            &format!(
                "initialized with {} components ({} available)",
                self.registry.len(),
                self.registry.available_count()
            ),
        );
        Ok(())
    }

    /// Drop cached state and stop answering; the registry is kept
    pub fn deinitialize(&mut self) {
        self.initialized = false;
        self.cache.clear();
        self.last_scores.clear();
        self.last_outcome = CycleOutcome::Uninitialized;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Add or update a primitive by name. Unknown names and invalid weights
    /// are logged and ignored.
    pub fn register_component(&mut self, name: &str, base_weight: f64) -> bool {
        match self.registry.register(name, base_weight) {
            Ok(primitive) => {
                self.bind_scorer(primitive);
                self.cache.invalidate();
                true
            }
            Err(e) => {
                let symbol = self.symbol.clone();
                self.log(&symbol, Severity::Warning, &format!("register {} ignored: {}", name, e));
                false
            }
        }
    }

    /// Add or replace a full descriptor. Invalid descriptors are logged and ignored.
    pub fn register_descriptor(&mut self, descriptor: ComponentDescriptor) -> bool {
        let primitive = descriptor.primitive;
        match self.registry.register_descriptor(descriptor) {
            Ok(()) => {
                self.bind_scorer(primitive);
                self.cache.invalidate();
                true
            }
            Err(e) => {
                let symbol = self.symbol.clone();
                self.log(
                    &symbol,
                    Severity::Warning,
                    &format!("register {} ignored: {}", primitive, e),
                );
                false
            }
        }
    }

    /// Toggle availability. A transition invalidates the cache.
    pub fn set_component_availability(&mut self, name: &str, available: bool) -> bool {
        let symbol = self.symbol.clone();
        let result = name
            .parse::<Primitive>()
            .and_then(|p| self.registry.set_availability(p, available).map(|changed| (p, changed)));
        match result {
            Ok((primitive, changed)) => {
                if changed {
                    self.cache.invalidate();
                    let required = self
                        .registry
                        .get(primitive)
                        .is_some_and(|e| e.descriptor.required);
                    if required && !available {
                        self.log(
                            &symbol,
                            Severity::Warning,
                            &format!("required component {} marked unavailable", primitive),
                        );
                    }
                }
                true
            }
            Err(e) => {
                self.log(
                    &symbol,
                    Severity::Warning,
                    &format!("availability change for {} ignored: {}", name, e),
                );
                false
            }
        }
    }

    /// Run one analysis cycle, or serve the cached result when it is fresh
    pub fn analyze(&mut self, symbol: &str, force_refresh: bool) -> AnalysisResult {
        let now = self.clock.now();
        if !self.initialized {
            self.last_outcome = CycleOutcome::Uninitialized;
            return AnalysisResult::uninitialized(symbol, now);
        }

        let generation = self.registry.generation();
        let reason = match self.cache.check(symbol, force_refresh, now, generation) {
            Ok(cached) => {
                let cached = cached.clone();
                self.last_outcome = CycleOutcome::Cached;
                return cached;
            }
            Err(reason) => reason,
        };

        let result = self.compute(symbol, now);
        self.symbol = symbol.to_string();
        self.cache.store(result.clone(), symbol, now, generation);
        self.last_outcome = CycleOutcome::Computed(reason);
        result
    }

    pub fn overall_confidence(&mut self, symbol: &str, force_refresh: bool) -> f64 {
        self.analyze(symbol, force_refresh).total_confidence
    }

    pub fn market_bias(&mut self, symbol: &str, force_refresh: bool) -> MarketBias {
        self.analyze(symbol, force_refresh).bias
    }

    pub fn signal(&mut self, symbol: &str, force_refresh: bool) -> TradeSignal {
        self.analyze(symbol, force_refresh).signal
    }

    pub fn is_signal_valid(&mut self, symbol: &str, min_confidence: f64) -> bool {
        self.initialized && self.analyze(symbol, false).is_signal_valid(min_confidence)
    }

    /// Last normalized score of a primitive, 0 if never scored
    pub fn component_score(&self, name: &str) -> f64 {
        name.parse::<Primitive>()
            .ok()
            .and_then(|p| self.last_scores.get(&p).copied())
            .unwrap_or(0.0)
    }

    /// Recompute now for the current symbol, bypassing the cache
    pub fn force_refresh(&mut self) -> AnalysisResult {
        let symbol = self.symbol.clone();
        self.analyze(&symbol, true)
    }

    pub fn invalidate_cache(&mut self) {
        self.cache.invalidate();
    }

    pub fn last_result(&self) -> Option<&AnalysisResult> {
        self.cache.last()
    }

    pub fn last_outcome(&self) -> CycleOutcome {
        self.last_outcome
    }

    /// `(bullish mass, bearish mass, total confidence)` of the last result
    pub fn directional_bias(&self) -> (f64, f64, f64) {
        self.cache
            .last()
            .map(|r| (r.bullish_mass, r.bearish_mass, r.total_confidence))
            .unwrap_or((0.0, 0.0, 0.0))
    }

    /// Label for the last result's confidence
    pub fn confidence_label(&self) -> &'static str {
        confidence_label(self.cache.last().map(|r| r.total_confidence).unwrap_or(0.0))
    }

    fn bind_scorer(&mut self, primitive: Primitive) {
        let scorer = self.scorers.as_ref().and_then(|p| p.resolve(primitive));
        if let Some(scorer) = scorer {
            if let Err(e) = self.registry.attach_scorer(primitive, scorer) {
                let symbol = self.symbol.clone();
                self.log(
                    &symbol,
                    Severity::Warning,
                    &format!("failed to bind scorer for {}: {}", primitive, e),
                );
            }
        }
    }

    fn compute(&mut self, symbol: &str, now: DateTime<Utc>) -> AnalysisResult {
        let regime = self
            .regime_detector
            .as_ref()
            .map(|d| d.detect(symbol))
            .unwrap_or_default();

        let entries: Vec<ComponentEntry> = self.registry.available().cloned().collect();
        let mut scores = Vec::with_capacity(entries.len());
        for entry in &entries {
            scores.push(self.score_component(symbol, entry, now));
        }
        for score in &scores {
            if let Some(primitive) = score.primitive {
                self.last_scores.insert(primitive, score.normalized_score);
            }
        }

        if scores.is_empty() {
            self.warn_throttled(symbol, "no-components", "no components available, using neutral fallback", now);
            return self.fallback(symbol, regime, FallbackReason::NoComponentsAvailable, now);
        }

        let inputs: Vec<(Primitive, f64)> = entries
            .iter()
            .map(|e| (e.primitive(), e.descriptor.base_weight))
            .collect();
        match self.distributor.distribute(&inputs, regime) {
            Ok(weights) => {
                for (score, weight) in scores.iter_mut().zip(weights) {
                    score.adjusted_weight = weight;
                    score.weighted_contribution = score.normalized_score * weight / 100.0;
                }
            }
            Err(stage) => {
                let message = match stage {
                    DegenerateStage::BaseWeights => "available base weights sum to zero",
                    DegenerateStage::RegimeAdjustment => "regime adjustment collapsed all weights",
                };
                self.log(
                    symbol,
                    Severity::Warning,
                    &format!("{}, confidence set to neutral", message),
                );
                // Real scores stay visible at zero weight next to the neutral entry
                let mut result =
                    self.fallback(symbol, regime, FallbackReason::DegenerateWeights, now);
                result.components.extend(scores);
                return result;
            }
        }

        let result = Aggregator::aggregate(symbol, scores, regime, None, now);
        let severity = if result.total_confidence >= self.settings.min_confidence_for_display {
            Severity::Info
        } else {
            Severity::Debug
        };
        self.log(symbol, severity, &result.to_string());
        result
    }

    fn score_component(
        &mut self,
        symbol: &str,
        entry: &ComponentEntry,
        now: DateTime<Utc>,
    ) -> ComponentScore {
        let descriptor = &entry.descriptor;
        let primitive = descriptor.primitive;
        let raw = match entry.scorer().map(|s| s.score(symbol)) {
            Some(Ok(raw)) if raw.is_finite() => Some(raw),
            Some(Ok(raw)) => {
                self.warn_throttled(
                    symbol,
                    &format!("{}:non-finite", primitive),
                    &format!("{} returned non-finite score {}, using neutral", primitive, raw),
                    now,
                );
                None
            }
            Some(Err(e)) => {
                self.warn_throttled(
                    symbol,
                    &format!("{}:unavailable", primitive),
                    &format!("{}: {}, using neutral", primitive, e),
                    now,
                );
                None
            }
            None => {
                self.warn_throttled(
                    symbol,
                    &format!("{}:no-scorer", primitive),
                    &format!("{} has no scorer, using neutral", primitive),
                    now,
                );
                None
            }
        };

        let (raw_score, normalized_score, substituted) = match raw {
            Some(raw) => (
                raw,
                normalize_score(raw, descriptor.min_threshold, descriptor.max_threshold),
                false,
            ),
            None => (NEUTRAL_SCORE, NEUTRAL_SCORE, true),
        };

        ComponentScore {
            name: primitive.to_string(),
            primitive: Some(primitive),
            raw_score,
            normalized_score,
            base_weight: descriptor.base_weight,
            adjusted_weight: 0.0,
            weighted_contribution: 0.0,
            rank: descriptor.rank,
            substituted,
        }
    }

    fn fallback(
        &self,
        symbol: &str,
        regime: MarketRegime,
        reason: FallbackReason,
        now: DateTime<Utc>,
    ) -> AnalysisResult {
        Aggregator::aggregate(
            symbol,
            vec![ComponentScore::synthetic_neutral(NEUTRAL_SCORE)],
            regime,
            Some(reason),
            now,
        )
    }

    fn warn_throttled(&mut self, symbol: &str, key: &str, message: &str, now: DateTime<Utc>) {
        if self.throttle.allow(key, now) {
            self.log(symbol, Severity::Warning, message);
        }
    }

    fn log(&self, symbol: &str, severity: Severity, message: &str) {
        self.log_sink.log(symbol, severity, SOURCE, message);
    }
}
