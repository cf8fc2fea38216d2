//! Error types for the streaming core.
//!
//! Every fallible operation returns [`StreamError`]. End of data is not an
//! error: it is reported as [`PullStatus::Exhausted`](crate::PullStatus) or
//! `Ok(None)`, depending on the component.

use std::io;

use thiserror::Error;
use tracing::warn;

/// Convenience type alias for Results using [`StreamError`].
pub type Result<T, E = StreamError> = std::result::Result<T, E>;

/// Top-level stream errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StreamError {
    /// The origin behind a source failed.
    #[error("source failure: {0}")]
    Source(#[source] io::Error),

    /// The destination behind a sink failed.
    #[error("sink failure: {0}")]
    Sink(#[source] io::Error),

    /// A line grew past the configured maximum without a delimiter.
    #[error("line too long: exceeds {limit} bytes")]
    LineTooLong {
        /// Maximum allowed line length, delimiter included.
        limit: usize,
    },

    /// A drained stream exceeded the caller's memory budget.
    #[error("out of budget: stream exceeds {limit} bytes")]
    OutOfBudget {
        /// The budget that was exceeded.
        limit: usize,
    },

    /// A sink accepted fewer bytes than it was offered.
    #[error("write shortfall: sink accepted {accepted} of {requested} bytes")]
    WriteShortfall {
        /// Bytes the sink took.
        accepted: usize,
        /// Bytes offered to the sink.
        requested: usize,
    },

    /// A single encoded value grew past the decoder's limit.
    #[error("value too long: exceeds {limit} bytes")]
    ValueTooLong {
        /// Maximum allowed encoded value length.
        limit: usize,
    },

    /// Structured decoding failed.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// I/O error from a framed async transport.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A pull or copy was requested with zero capacity.
    #[error("capacity must be positive")]
    ZeroCapacity,

    /// The component already failed and refuses to continue.
    #[error("stream previously failed: {cause}")]
    Terminated {
        /// Display text of the original failure.
        cause: String,
    },
}

impl StreamError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Source(_) => "source_failure",
            Self::Sink(_) => "sink_failure",
            Self::LineTooLong { .. } => "line_too_long",
            Self::OutOfBudget { .. } => "out_of_budget",
            Self::WriteShortfall { .. } => "write_shortfall",
            Self::ValueTooLong { .. } => "value_too_long",
            Self::Parse(_) => "parse_error",
            Self::Io(_) => "io_error",
            Self::ZeroCapacity => "zero_capacity",
            Self::Terminated { .. } => "terminated",
        }
    }

    /// Whether this error replays an earlier failure rather than reporting a new one.
    pub fn is_terminal_replay(&self) -> bool {
        matches!(self, Self::Terminated { .. })
    }
}

/// Errors produced while framing or converting structured values.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// The located value is not valid for the format or the requested type.
    #[error("syntax error: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The stream ended in the middle of a value.
    #[error("stream ended inside a value ({buffered} bytes buffered)")]
    Truncated {
        /// Bytes of the incomplete value held when the stream ended.
        buffered: usize,
    },
}

/// Failure of [`copy`](crate::copy()), carrying how far it got.
#[derive(Debug, Error)]
#[error("copy failed after {copied} bytes: {source}")]
pub struct CopyError {
    /// Bytes delivered to the sink before the failure.
    pub copied: u64,
    /// What went wrong.
    #[source]
    pub source: StreamError,
}

/// Records the first failure of a stateful component and replays it.
///
/// `ZeroCapacity` is a caller mistake, not a stream fault, so it never trips.
#[derive(Debug, Default)]
pub(crate) struct Latch {
    cause: Option<String>,
}

impl Latch {
    pub(crate) fn check(&self) -> Result<()> {
        match &self.cause {
            Some(cause) => Err(StreamError::Terminated {
                cause: cause.clone(),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn guard<T>(&mut self, component: &'static str, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            self.trip(component, err);
        }
        result
    }

    /// Record `err` without returning it. Later calls replay it.
    pub(crate) fn trip(&mut self, component: &'static str, err: &StreamError) {
        if self.cause.is_none() && !matches!(err, StreamError::ZeroCapacity) {
            warn!(component, code = err.error_code(), error = %err, "stream failed");
            self.cause = Some(err.to_string());
        }
    }

    #[cfg(test)]
    pub(crate) fn is_tripped(&self) -> bool {
        self.cause.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StreamError::WriteShortfall {
            accepted: 3,
            requested: 8,
        };
        assert_eq!(
            err.to_string(),
            "write shortfall: sink accepted 3 of 8 bytes"
        );

        let err = StreamError::OutOfBudget { limit: 3 };
        assert_eq!(err.to_string(), "out of budget: stream exceeds 3 bytes");
    }

    #[test]
    fn test_error_source_chaining() {
        let io_err = io::Error::new(io::ErrorKind::BrokenPipe, "broken pipe");
        let err = StreamError::Source(io_err);

        let source = std::error::Error::source(&err);
        assert!(source.is_some());
        assert_eq!(source.unwrap().to_string(), "broken pipe");

        let copy_err = CopyError {
            copied: 12,
            source: err,
        };
        assert_eq!(
            copy_err.to_string(),
            "copy failed after 12 bytes: source failure: broken pipe"
        );
        assert!(std::error::Error::source(&copy_err).is_some());
    }

    #[test]
    fn test_parse_error_conversion() {
        let json_err = serde_json::from_slice::<serde_json::Value>(b"{").unwrap_err();
        let err: StreamError = ParseError::from(json_err).into();
        assert_eq!(err.error_code(), "parse_error");
    }

    #[test]
    fn test_latch_replays_first_failure() {
        let mut latch = Latch::default();
        assert!(latch.check().is_ok());

        let first: Result<()> = Err(StreamError::LineTooLong { limit: 4 });
        assert!(latch.guard("test", first).is_err());
        let second: Result<()> = Err(StreamError::OutOfBudget { limit: 1 });
        assert!(latch.guard("test", second).is_err());

        match latch.check() {
            Err(StreamError::Terminated { cause }) => {
                assert_eq!(cause, "line too long: exceeds 4 bytes");
            }
            other => panic!("Expected Terminated, got {:?}", other),
        }
    }

    #[test]
    fn test_latch_ignores_zero_capacity() {
        let mut latch = Latch::default();
        let result: Result<()> = Err(StreamError::ZeroCapacity);
        assert!(latch.guard("test", result).is_err());
        assert!(!latch.is_tripped());
    }
}
