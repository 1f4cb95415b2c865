//! Environment detection and engine configuration
//!
//! Configuration is read from an optional JSON file (`AWCE_CONFIG`) and then
//! overridden by individual environment variables.

use crate::components::{ComponentDescriptor, Preset, Primitive};
use crate::error::ConfigError;
use crate::models::MarketRegime;
use crate::signals::categories::{MultiplierOverride, RegimeMultiplierTable, RegimeWeights};
use crate::signals::engine::EngineSettings;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::str::FromStr;

pub const CONFIG_PATH_ENV: &str = "AWCE_CONFIG";

// Largest second count chrono::Duration accepts
const MAX_SECONDS: u64 = (i64::MAX / 1_000) as u64;

/// Deployment environment, `sandbox` unless told otherwise
pub fn get_environment() -> String {
    env::var("ENVIRONMENT")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| "sandbox".to_string())
        .to_lowercase()
}

/// One component entry of the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    pub name: String,
    pub base_weight: f64,
    #[serde(default)]
    pub min_threshold: Option<f64>,
    #[serde(default)]
    pub max_threshold: Option<f64>,
    #[serde(default)]
    pub required: bool,
}

impl ComponentConfig {
    pub fn descriptor(&self) -> Result<ComponentDescriptor, ConfigError> {
        let primitive = Primitive::from_str(&self.name)
            .map_err(|e| ConfigError::Validation(e.to_string()))?;
        let mut descriptor = ComponentDescriptor::new(primitive, self.base_weight).with_thresholds(
            self.min_threshold
                .unwrap_or(ComponentDescriptor::DEFAULT_MIN_THRESHOLD),
            self.max_threshold
                .unwrap_or(ComponentDescriptor::DEFAULT_MAX_THRESHOLD),
        );
        descriptor.required = self.required;
        Ok(descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub symbol: String,
    pub cache_ttl_secs: u64,
    pub min_confidence_for_display: f64,
    pub min_confidence_floor: f64,
    pub regime_cache_ttl_secs: u64,
    pub warning_throttle_secs: u64,
    /// Pushed scores older than this are treated as unavailable
    pub score_max_age_secs: u64,
    pub preset: Option<Preset>,
    pub components: Vec<ComponentConfig>,
    pub regime_weights: RegimeWeights,
    pub overrides: Vec<MultiplierOverride>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: "BTC-PERP".to_string(),
            cache_ttl_secs: 3,
            min_confidence_for_display: 60.0,
            min_confidence_floor: 10.0,
            regime_cache_ttl_secs: 5,
            warning_throttle_secs: 60,
            score_max_age_secs: 120,
            preset: None,
            components: Vec::new(),
            regime_weights: RegimeWeights::default(),
            overrides: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// File named by `AWCE_CONFIG` (if set), then environment overrides, then validation
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => Self::default(),
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Apply `AWCE_*` environment overrides
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(symbol) = env::var("AWCE_SYMBOL") {
            if !symbol.trim().is_empty() {
                self.symbol = symbol.trim().to_string();
            }
        }
        if let Some(ttl) = parse_env::<u64>("AWCE_CACHE_TTL_SECONDS")? {
            self.cache_ttl_secs = ttl;
        }
        if let Some(min_confidence) = parse_env::<f64>("AWCE_MIN_CONFIDENCE")? {
            self.min_confidence_for_display = min_confidence;
        }
        if let Some(floor) = parse_env::<f64>("AWCE_CONFIDENCE_FLOOR")? {
            self.min_confidence_floor = floor;
        }
        if let Ok(preset) = env::var("AWCE_PRESET") {
            if !preset.trim().is_empty() {
                self.preset = Some(preset.parse()?);
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbol.trim().is_empty() {
            return Err(ConfigError::Validation("symbol must not be empty".to_string()));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Validation(
                "cache_ttl_secs must be greater than 0".to_string(),
            ));
        }
        for (name, value) in [
            ("min_confidence_for_display", self.min_confidence_for_display),
            ("min_confidence_floor", self.min_confidence_floor),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }
        self.regime_weights
            .validate()
            .map_err(ConfigError::Validation)?;
        for entry in &self.overrides {
            if entry.regime == MarketRegime::Unknown {
                return Err(ConfigError::Validation(format!(
                    "override for {}/{} not allowed: the unknown regime is never reweighted",
                    entry.regime, entry.primitive
                )));
            }
            if !entry.multiplier.is_finite() || entry.multiplier < 0.0 {
                return Err(ConfigError::Validation(format!(
                    "override for {}/{} must be >= 0, got {}",
                    entry.regime, entry.primitive, entry.multiplier
                )));
            }
        }
        for descriptor in self.descriptors()? {
            descriptor
                .validate()
                .map_err(|e| ConfigError::Validation(e.to_string()))?;
        }
        Ok(())
    }

    /// Preset descriptors (market structure when nothing is configured) with
    /// explicit component entries layered on top
    pub fn descriptors(&self) -> Result<Vec<ComponentDescriptor>, ConfigError> {
        let mut descriptors = match (self.preset, self.components.is_empty()) {
            (Some(preset), _) => preset.descriptors(),
            (None, true) => Preset::default().descriptors(),
            (None, false) => Vec::new(),
        };
        for component in &self.components {
            let descriptor = component.descriptor()?;
            match descriptors
                .iter_mut()
                .find(|d| d.primitive == descriptor.primitive)
            {
                Some(existing) => *existing = descriptor,
                None => descriptors.push(descriptor),
            }
        }
        Ok(descriptors)
    }

    pub fn multipliers(&self) -> RegimeMultiplierTable {
        RegimeMultiplierTable::from_weights(&self.regime_weights, &self.overrides)
    }

    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            cache_ttl: secs(self.cache_ttl_secs),
            min_confidence_floor: self.min_confidence_floor,
            min_confidence_for_display: self.min_confidence_for_display,
            warning_throttle: secs(self.warning_throttle_secs),
            multipliers: self.multipliers(),
        }
    }

    pub fn regime_cache_ttl(&self) -> Duration {
        secs(self.regime_cache_ttl_secs)
    }

    pub fn score_max_age(&self) -> Duration {
        secs(self.score_max_age_secs)
    }
}

fn secs(value: u64) -> Duration {
    Duration::seconds(value.min(MAX_SECONDS) as i64)
}

/// `Ok(None)` when unset, `InvalidEnv` when set but unparsable
pub fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                key: key.to_string(),
                value,
            }),
        Err(_) => Ok(None),
    }
}
