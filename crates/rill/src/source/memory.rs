//! In-memory sources.

use bytes::Bytes;
use tracing::trace;

use super::{Pull, StreamSource};
use crate::error::{Result, StreamError};

/// A source over a fixed byte sequence.
///
/// The final pull carries the last bytes together with
/// [`PullStatus::Exhausted`](super::PullStatus::Exhausted).
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    offset: usize,
}

impl MemorySource {
    /// Create a source over `data`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            offset: 0,
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Bytes not yet pulled.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Total length of the underlying data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying data is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StreamSource for MemorySource {
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        if buf.is_empty() {
            return Err(StreamError::ZeroCapacity);
        }

        let n = self.remaining().min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.offset..self.offset + n]);
        self.offset += n;
        trace!(pulled = n, offset = self.offset, "memory pull");

        if self.offset == self.data.len() {
            Ok(Pull::exhausted(n))
        } else {
            Ok(Pull::ongoing(n))
        }
    }
}

/// A source over the UTF-8 encoding of a string.
#[derive(Debug, Clone)]
pub struct TextSource {
    inner: MemorySource,
}

impl TextSource {
    /// Encode `text` and create a source over it.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            inner: MemorySource::new(text.into().into_bytes()),
        }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.inner.position()
    }

    /// Bytes not yet pulled.
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl StreamSource for TextSource {
    #[inline]
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        self.inner.pull(buf)
    }
}
