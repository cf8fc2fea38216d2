//! Pull-based byte sources.
//!
//! A [`StreamSource`] is anything bytes can be pulled from, one chunk at a
//! time, until it is exhausted or fails. Sources are consumed irrevocably:
//! there is no rewind.
//!
//! # Adapters
//!
//! - [`MemorySource`]: a fixed byte sequence held in memory
//! - [`TextSource`]: a string, encoded to UTF-8 up front
//! - [`PassthroughSource`]: any already-open [`std::io::Read`] origin (files,
//!   stdin, HTTP bodies)
//! - [`RepeatSource`]: an endless (or length-bounded) repeating pattern
//! - [`BufferStream`](crate::BufferStream): an in-memory queue that is both a
//!   source and a sink
//!
//! # Contract
//!
//! ```rust
//! use rill::{MemorySource, PullStatus, StreamSource};
//!
//! let mut source = MemorySource::new(&b"hello"[..]);
//! let mut buf = [0u8; 8];
//!
//! let pull = source.pull(&mut buf).unwrap();
//! // The final chunk may carry data and the end-of-stream signal together.
//! assert_eq!(&buf[..pull.len], b"hello");
//! assert_eq!(pull.status, PullStatus::Exhausted);
//!
//! // Exhaustion is idempotent.
//! let pull = source.pull(&mut buf).unwrap();
//! assert_eq!(pull.len, 0);
//! assert!(pull.is_exhausted());
//! ```

mod memory;
mod passthrough;
mod repeat;

pub use memory::{MemorySource, TextSource};
pub use passthrough::PassthroughSource;
pub use repeat::RepeatSource;

use crate::error::Result;

/// Whether a source may still yield bytes after a pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PullStatus {
    /// More bytes may follow.
    Ongoing,
    /// The source has reached its normal end of data.
    Exhausted,
}

/// Outcome of a successful [`StreamSource::pull`].
///
/// `len` bytes at the front of the caller's buffer are valid. A pull can carry
/// data and [`PullStatus::Exhausted`] at the same time, so callers must
/// consume `len` bytes before acting on `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pull {
    /// Number of bytes written into the front of the buffer.
    pub len: usize,
    /// Stream state after this pull.
    pub status: PullStatus,
}

impl Pull {
    /// A pull that delivered `len` bytes with more possibly to come.
    pub const fn ongoing(len: usize) -> Self {
        Self {
            len,
            status: PullStatus::Ongoing,
        }
    }

    /// A pull that delivered `len` final bytes.
    pub const fn exhausted(len: usize) -> Self {
        Self {
            len,
            status: PullStatus::Exhausted,
        }
    }

    /// Returns `true` if the source has no more data.
    pub const fn is_exhausted(&self) -> bool {
        matches!(self.status, PullStatus::Exhausted)
    }
}

/// Something bytes can be pulled from.
///
/// # Contract
///
/// - The capacity of a pull is `buf.len()` and must be positive; an empty
///   buffer yields [`StreamError::ZeroCapacity`](crate::StreamError::ZeroCapacity).
/// - `Pull::len` never exceeds `buf.len()`.
/// - Once a pull reports [`PullStatus::Exhausted`], every later pull reports
///   `Exhausted` with zero bytes.
/// - An `Err` is terminal: later pulls fail too (normally with
///   [`StreamError::Terminated`](crate::StreamError::Terminated)); a new source
///   must be constructed to retry.
/// - A pull may block the calling thread while the origin produces data.
///
/// A source allows only one pull in flight; `&mut self` enforces that.
pub trait StreamSource {
    /// Pull up to `buf.len()` bytes into the front of `buf`.
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull>;
}

impl<S: StreamSource + ?Sized> StreamSource for &mut S {
    #[inline]
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        (**self).pull(buf)
    }
}

impl<S: StreamSource + ?Sized> StreamSource for Box<S> {
    #[inline]
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        (**self).pull(buf)
    }
}
