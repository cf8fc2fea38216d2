//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use rill::{DEFAULT_COPY_CHUNK_SIZE, DEFAULT_MAX_LINE_LEN, DEFAULT_MAX_VALUE_LEN};

// =============================================================================
// Stream Defaults
// =============================================================================

pub fn default_chunk_size() -> usize {
    DEFAULT_COPY_CHUNK_SIZE
}

pub fn default_max_line_len() -> usize {
    DEFAULT_MAX_LINE_LEN
}

pub fn default_delimiter() -> String {
    "\n".to_string()
}

pub fn default_max_value_len() -> usize {
    DEFAULT_MAX_VALUE_LEN
}

// =============================================================================
// HTTP Defaults
// =============================================================================

pub fn default_timeout_secs() -> u64 {
    30
}

pub fn default_user_agent() -> String {
    format!("rillcat/{}", env!("CARGO_PKG_VERSION"))
}

// =============================================================================
// Log Defaults
// =============================================================================

pub fn default_log_level() -> String {
    "info".to_string()
}
