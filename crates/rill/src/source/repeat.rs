//! A source that repeats a byte pattern.

use bytes::Bytes;

use super::{Pull, StreamSource};
use crate::error::{Result, StreamError};

/// Fills every pull with a repeating pattern.
///
/// Unbounded by default: every pull fills the whole buffer and reports
/// [`PullStatus::Ongoing`](super::PullStatus::Ongoing), so only a consumer
/// with its own limit (such as [`drain`](crate::drain()) with a budget) should
/// read it to the end. An empty pattern is exhausted immediately.
#[derive(Debug, Clone)]
pub struct RepeatSource {
    pattern: Bytes,
    phase: usize,
    remaining: Option<u64>,
}

impl RepeatSource {
    /// Repeat `pattern` forever.
    pub fn new(pattern: impl Into<Bytes>) -> Self {
        Self {
            pattern: pattern.into(),
            phase: 0,
            remaining: None,
        }
    }

    /// Repeat `pattern` until `total` bytes have been produced.
    pub fn bounded(pattern: impl Into<Bytes>, total: u64) -> Self {
        Self {
            pattern: pattern.into(),
            phase: 0,
            remaining: Some(total),
        }
    }
}

impl StreamSource for RepeatSource {
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        if buf.is_empty() {
            return Err(StreamError::ZeroCapacity);
        }
        if self.pattern.is_empty() || self.remaining == Some(0) {
            return Ok(Pull::exhausted(0));
        }

        let n = match self.remaining {
            Some(left) => buf.len().min(usize::try_from(left).unwrap_or(usize::MAX)),
            None => buf.len(),
        };
        for byte in &mut buf[..n] {
            *byte = self.pattern[self.phase];
            self.phase = (self.phase + 1) % self.pattern.len();
        }

        match self.remaining.as_mut() {
            Some(left) => {
                *left -= n as u64;
                if *left == 0 {
                    Ok(Pull::exhausted(n))
                } else {
                    Ok(Pull::ongoing(n))
                }
            }
            None => Ok(Pull::ongoing(n)),
        }
    }
}
