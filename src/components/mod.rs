//! Primitive registry and configuration presets.

pub mod presets;
pub mod registry;

pub use presets::Preset;
pub use registry::*;
