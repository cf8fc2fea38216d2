//! Adapter for already-open `std::io::Read` origins.

use std::io::{self, Read};

use tracing::trace;

use super::{Pull, StreamSource};
use crate::error::{Latch, Result, StreamError};

/// Forwards pulls 1:1 to an external [`Read`] origin.
///
/// `Ok(0)` from the origin becomes [`PullStatus::Exhausted`](super::PullStatus::Exhausted)
/// and the origin is not read again. `ErrorKind::Interrupted` is retried;
/// any other error becomes [`StreamError::Source`] and is terminal.
///
/// Timeouts and cancellation belong to the origin (for example a socket read
/// timeout or an HTTP client timeout); this adapter never imposes its own.
///
/// ```rust
/// use rill::{PassthroughSource, StreamSource};
///
/// let origin = std::io::Cursor::new(b"from a reader".to_vec());
/// let mut source = PassthroughSource::new(origin);
/// let data = rill::drain(&mut source, None).unwrap();
/// assert_eq!(&data[..], b"from a reader");
/// ```
#[derive(Debug)]
pub struct PassthroughSource<R> {
    origin: R,
    exhausted: bool,
    latch: Latch,
}

impl<R: Read> PassthroughSource<R> {
    /// Wrap an open origin.
    pub fn new(origin: R) -> Self {
        Self {
            origin,
            exhausted: false,
            latch: Latch::default(),
        }
    }

    /// Borrow the origin.
    pub fn get_ref(&self) -> &R {
        &self.origin
    }

    /// Consume the adapter and return the origin.
    pub fn into_inner(self) -> R {
        self.origin
    }

    fn read_origin(&mut self, buf: &mut [u8]) -> Result<Pull> {
        loop {
            match self.origin.read(buf) {
                Ok(0) => {
                    self.exhausted = true;
                    trace!("origin reached end of data");
                    return Ok(Pull::exhausted(0));
                }
                Ok(n) if n > buf.len() => {
                    return Err(StreamError::Source(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("origin reported {} bytes for a {} byte buffer", n, buf.len()),
                    )));
                }
                Ok(n) => {
                    trace!(pulled = n, "passthrough pull");
                    return Ok(Pull::ongoing(n));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StreamError::Source(e)),
            }
        }
    }
}

impl<R: Read> StreamSource for PassthroughSource<R> {
    fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
        self.latch.check()?;
        if buf.is_empty() {
            return Err(StreamError::ZeroCapacity);
        }
        if self.exhausted {
            return Ok(Pull::exhausted(0));
        }

        let result = self.read_origin(buf);
        self.latch.guard("passthrough", result)
    }
}
