//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions and loading
//! - [`defaults`]: serde default functions
//! - [`validation`]: startup checks that report every problem at once

mod defaults;
mod types;
mod validation;

pub use types::{Config, ConfigError, HttpConfig, StreamConfig};
pub use validation::validate;

use std::path::Path;

impl Config {
    /// Load `path` if given, otherwise use the built-in defaults, then validate.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        validate(&config).map_err(ConfigError::Invalid)?;
        Ok(config)
    }
}
