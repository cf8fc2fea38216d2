//! In-memory buffer that is both a source and a sink.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Result, StreamError};
use crate::sink::StreamSink;
use crate::source::{Pull, StreamSource};

/// A FIFO byte queue: pushes append at the back, pulls take from the front.
///
/// Pulling from an empty buffer reports
/// [`PullStatus::Exhausted`](crate::PullStatus::Exhausted) with zero bytes.
/// Unlike other sources the buffer is readable again after a later push; it
/// is a queue, not a stream with a fixed end.
///
/// ```rust
/// use rill::{BufferStream, StreamSink, StreamSource};
///
/// let mut buffer = BufferStream::new();
/// buffer.push(b"queued").unwrap();
///
/// let mut out = [0u8; 16];
/// let pull = buffer.pull(&mut out).unwrap();
/// assert_eq!(&out[..pull.len], b"queued");
/// assert!(pull.is_exhausted());
/// ```
#[derive(Debug, Clone, Default)]
pub struct BufferStream {
    buf: BytesMut,
}

impl BufferStream {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes waiting to be pulled.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns `true` if nothing is waiting.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// View the pending bytes without consuming them.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the buffer and return the pending bytes.
    pub fn into_bytes(self) -> Bytes {
        self.buf.freeze()
    }
}

impl From<&[u8]> for BufferStream {
    fn from(data: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(data),
        }
    }
}

impl StreamSource for BufferStream {
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        if buf.is_empty() {
            return Err(StreamError::ZeroCapacity);
        }

        let n = self.buf.len().min(buf.len());
        self.buf.copy_to_slice(&mut buf[..n]);
        if self.buf.is_empty() {
            Ok(Pull::exhausted(n))
        } else {
            Ok(Pull::ongoing(n))
        }
    }
}

impl StreamSink for BufferStream {
    fn push(&mut self, buf: &[u8]) -> Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }
}
