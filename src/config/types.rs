//! Core configuration types and loading.

use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::defaults::*;
use super::validation::ValidationError;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Application configuration.
///
/// Every section is optional; a missing file section falls back to the
/// built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Chunking and limits for the streaming core.
    #[serde(default)]
    pub stream: StreamConfig,
    /// HTTP origin settings.
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Streaming limits and chunk sizes.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StreamConfig {
    /// Bytes moved per copy step and requested per line or decoder refill.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Longest accepted line, delimiter included.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Line delimiter; must be exactly one byte.
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    /// Budget for `drain` (unlimited when absent).
    #[serde(default)]
    pub max_drain_bytes: Option<usize>,
    /// Largest encoded value the JSON decoder will buffer.
    #[serde(default = "default_max_value_len")]
    pub max_value_len: usize,
}

impl StreamConfig {
    /// The delimiter as a byte. Falls back to newline for an empty string.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b'\n')
    }

    /// Drain budget; zero is treated as unlimited.
    pub fn drain_budget(&self) -> Option<NonZeroUsize> {
        self.max_drain_bytes.and_then(NonZeroUsize::new)
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            max_line_len: default_max_line_len(),
            delimiter: default_delimiter(),
            max_drain_bytes: None,
            max_value_len: default_max_value_len(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// `User-Agent` header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is not set (e.g. `info`, `rill=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
