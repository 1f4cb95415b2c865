//! Component registry and typed primitive identifiers

use crate::error::EngineError;
use crate::services::scorer::{PrimitiveScorer, ScorerProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Primitive analyzers the engine knows how to weight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    TrendStrength,
    Momentum,
    MultiTimeframe,
    OrderBlock,
    OrderFlow,
    Liquidity,
    StructureBreak,
    FairValueGap,
    Volume,
    Divergence,
    Volatility,
}

impl Primitive {
    pub fn all() -> [Primitive; 11] {
        [
            Primitive::TrendStrength,
            Primitive::Momentum,
            Primitive::MultiTimeframe,
            Primitive::OrderBlock,
            Primitive::OrderFlow,
            Primitive::Liquidity,
            Primitive::StructureBreak,
            Primitive::FairValueGap,
            Primitive::Volume,
            Primitive::Divergence,
            Primitive::Volatility,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::TrendStrength => "trend_strength",
            Primitive::Momentum => "momentum",
            Primitive::MultiTimeframe => "multi_timeframe",
            Primitive::OrderBlock => "order_block",
            Primitive::OrderFlow => "order_flow",
            Primitive::Liquidity => "liquidity",
            Primitive::StructureBreak => "structure_break",
            Primitive::FairValueGap => "fair_value_gap",
            Primitive::Volume => "volume",
            Primitive::Divergence => "divergence",
            Primitive::Volatility => "volatility",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Primitive::TrendStrength => "Trend Strength",
            Primitive::Momentum => "Momentum",
            Primitive::MultiTimeframe => "Multi-Timeframe",
            Primitive::OrderBlock => "Order Block",
            Primitive::OrderFlow => "Order Flow",
            Primitive::Liquidity => "Liquidity",
            Primitive::StructureBreak => "Structure Break",
            Primitive::FairValueGap => "Fair Value Gap",
            Primitive::Volume => "Volume",
            Primitive::Divergence => "Divergence",
            Primitive::Volatility => "Volatility",
        }
    }

    /// Declared strength ordering (1 = strongest). Informational only.
    pub fn default_rank(&self) -> u8 {
        match self {
            Primitive::TrendStrength => 1,
            Primitive::MultiTimeframe => 2,
            Primitive::StructureBreak => 3,
            Primitive::OrderBlock => 4,
            Primitive::OrderFlow => 5,
            Primitive::Liquidity => 6,
            Primitive::Momentum => 7,
            Primitive::FairValueGap => 8,
            Primitive::Divergence => 9,
            Primitive::Volume => 10,
            Primitive::Volatility => 11,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Primitive {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Primitive::all()
            .into_iter()
            .find(|p| p.as_str() == key)
            .ok_or_else(|| EngineError::UnknownPrimitive(s.to_string()))
    }
}

/// Configuration of a single primitive
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    pub primitive: Primitive,
    pub base_weight: f64,
    pub min_threshold: f64,
    pub max_threshold: f64,
    pub required: bool,
    pub rank: u8,
}

impl ComponentDescriptor {
    pub const DEFAULT_MIN_THRESHOLD: f64 = 0.0;
    pub const DEFAULT_MAX_THRESHOLD: f64 = 100.0;

    pub fn new(primitive: Primitive, base_weight: f64) -> Self {
        Self {
            primitive,
            base_weight,
            min_threshold: Self::DEFAULT_MIN_THRESHOLD,
            max_threshold: Self::DEFAULT_MAX_THRESHOLD,
            required: false,
            rank: primitive.default_rank(),
        }
    }

    pub fn with_thresholds(mut self, min_threshold: f64, max_threshold: f64) -> Self {
        self.min_threshold = min_threshold;
        self.max_threshold = max_threshold;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.base_weight.is_finite() || self.base_weight < 0.0 {
            return Err(EngineError::InvalidWeight {
                primitive: self.primitive.to_string(),
                weight: self.base_weight,
            });
        }
        if !(self.min_threshold < self.max_threshold) {
            return Err(EngineError::InvalidThresholds {
                primitive: self.primitive.to_string(),
                min: self.min_threshold,
                max: self.max_threshold,
            });
        }
        Ok(())
    }
}

/// Registered descriptor with its availability and resolved scorer
#[derive(Clone)]
pub struct ComponentEntry {
    pub descriptor: ComponentDescriptor,
    pub available: bool,
    scorer: Option<Arc<dyn PrimitiveScorer>>,
}

impl ComponentEntry {
    pub fn primitive(&self) -> Primitive {
        self.descriptor.primitive
    }

    pub fn scorer(&self) -> Option<&Arc<dyn PrimitiveScorer>> {
        self.scorer.as_ref()
    }

    pub fn has_scorer(&self) -> bool {
        self.scorer.is_some()
    }
}

impl fmt::Debug for ComponentEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentEntry")
            .field("descriptor", &self.descriptor)
            .field("available", &self.available)
            .field("has_scorer", &self.scorer.is_some())
            .finish()
    }
}

/// Holds registered primitives in registration order.
///
/// `generation` increases on every mutation so that cached results
/// computed against an older registry state can be detected.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entries: Vec<ComponentEntry>,
    generation: u64,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a primitive by name, marking it available.
    ///
    /// Updating keeps the existing thresholds and scorer.
    pub fn register(&mut self, name: &str, base_weight: f64) -> Result<Primitive, EngineError> {
        let primitive: Primitive = name.parse()?;
        let descriptor = match self.get(primitive) {
            Some(entry) => ComponentDescriptor {
                base_weight,
                ..entry.descriptor.clone()
            },
            None => ComponentDescriptor::new(primitive, base_weight),
        };
        self.register_descriptor(descriptor)?;
        Ok(primitive)
    }

    /// Add or replace a full descriptor, marking it available
    pub fn register_descriptor(&mut self, descriptor: ComponentDescriptor) -> Result<(), EngineError> {
        descriptor.validate()?;
        match self
            .entries
            .iter_mut()
            .find(|e| e.descriptor.primitive == descriptor.primitive)
        {
            Some(entry) => {
                entry.descriptor = descriptor;
                entry.available = true;
            }
            None => self.entries.push(ComponentEntry {
                descriptor,
                available: true,
                scorer: None,
            }),
        }
        self.generation += 1;
        Ok(())
    }

    /// Toggle availability. Returns `true` when the flag actually changed.
    pub fn set_availability(
        &mut self,
        primitive: Primitive,
        available: bool,
    ) -> Result<bool, EngineError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.descriptor.primitive == primitive)
            .ok_or_else(|| EngineError::ComponentNotRegistered(primitive.to_string()))?;
        if entry.available == available {
            return Ok(false);
        }
        entry.available = available;
        self.generation += 1;
        Ok(true)
    }

    pub fn attach_scorer(
        &mut self,
        primitive: Primitive,
        scorer: Arc<dyn PrimitiveScorer>,
    ) -> Result<(), EngineError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.descriptor.primitive == primitive)
            .ok_or_else(|| EngineError::ComponentNotRegistered(primitive.to_string()))?;
        entry.scorer = Some(scorer);
        self.generation += 1;
        Ok(())
    }

    /// Resolve a scorer for every registered primitive from `provider`.
    /// Primitives the provider cannot serve keep their previous scorer.
    pub fn resolve_scorers(&mut self, provider: &dyn ScorerProvider) {
        for entry in &mut self.entries {
            if let Some(scorer) = provider.resolve(entry.descriptor.primitive) {
                entry.scorer = Some(scorer);
            }
        }
        self.generation += 1;
    }

    pub fn get(&self, primitive: Primitive) -> Option<&ComponentEntry> {
        self.entries
            .iter()
            .find(|e| e.descriptor.primitive == primitive)
    }

    pub fn entries(&self) -> &[ComponentEntry] {
        &self.entries
    }

    pub fn available(&self) -> impl Iterator<Item = &ComponentEntry> {
        self.entries.iter().filter(|e| e.available)
    }

    pub fn available_count(&self) -> usize {
        self.available().count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// At least one registered primitive carries a positive base weight
    pub fn has_weighted_component(&self) -> bool {
        self.entries.iter().any(|e| e.descriptor.base_weight > 0.0)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
