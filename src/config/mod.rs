//! Configuration module
//!
//! Typed configuration for the observer, loaded from an optional TOML
//! file with `MCTOP_*` environment overrides, then CLI overrides on top.

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{create_default_config, load_config};
pub use types::Config;
pub use validation::ConfigError;
