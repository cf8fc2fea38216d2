//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("stream.chunk_size must be greater than 0")]
    ZeroChunkSize,
    #[error("stream.max_line_len must be greater than 0")]
    ZeroMaxLineLen,
    #[error("stream.max_value_len must be greater than 0")]
    ZeroMaxValueLen,
    #[error("stream.delimiter must be exactly one byte, got {0} bytes")]
    InvalidDelimiter(usize),
    #[error("http.timeout_secs must be greater than 0")]
    ZeroTimeout,
    #[error("http.user_agent is required")]
    MissingUserAgent,
    #[error("log.level is not a valid filter: '{0}'")]
    InvalidLogLevel(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Stream limits
    if config.stream.chunk_size == 0 {
        errors.push(ValidationError::ZeroChunkSize);
    }
    if config.stream.max_line_len == 0 {
        errors.push(ValidationError::ZeroMaxLineLen);
    }
    if config.stream.max_value_len == 0 {
        errors.push(ValidationError::ZeroMaxValueLen);
    }
    let delimiter_len = config.stream.delimiter.len();
    if delimiter_len != 1 {
        errors.push(ValidationError::InvalidDelimiter(delimiter_len));
    }

    // HTTP
    if config.http.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }
    if config.http.user_agent.trim().is_empty() {
        errors.push(ValidationError::MissingUserAgent);
    }

    // Logging
    if EnvFilter::try_new(&config.log.level).is_err() {
        errors.push(ValidationError::InvalidLogLevel(config.log.level.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
