use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("Engine is not initialized")]
    NotInitialized,

    #[error("No registered component carries a positive base weight")]
    NoWeightedComponents,

    #[error("Unknown primitive: {0}")]
    UnknownPrimitive(String),

    #[error("Invalid thresholds for {primitive}: min {min} must be below max {max}")]
    InvalidThresholds { primitive: String, min: f64, max: f64 },

    #[error("Invalid base weight for {primitive}: {weight}")]
    InvalidWeight { primitive: String, weight: f64 },

    #[error("Component not registered: {0}")]
    ComponentNotRegistered(String),

    #[error("Symbol not tracked: {0}")]
    UnknownSymbol(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
}
