//! Read a whole source into memory.

use std::num::NonZeroUsize;

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::{Result, StreamError};
use crate::source::StreamSource;

/// Bytes requested per pull while draining.
pub const DRAIN_CHUNK_SIZE: usize = 4096;

/// Pull every byte of `source` into one buffer.
///
/// This loads the entire stream into memory. On large or untrusted sources
/// pass a `max_bytes` budget, or stream with [`copy`](crate::copy()) instead.
/// `None` means no limit, at the caller's risk.
///
/// With a budget, at most `max_bytes + 1` bytes are ever buffered: as soon as
/// the stream proves longer than `max_bytes` this fails with
/// [`StreamError::OutOfBudget`] and the partial data is discarded.
///
/// The source is fully consumed on success.
///
/// ```rust
/// use std::num::NonZeroUsize;
/// use rill::{drain, StreamError, TextSource};
///
/// let data = drain(&mut TextSource::new("Hello"), None).unwrap();
/// assert_eq!(&data[..], b"Hello");
///
/// let budget = NonZeroUsize::new(3);
/// let result = drain(&mut TextSource::new("0123456789"), budget);
/// assert!(matches!(result, Err(StreamError::OutOfBudget { limit: 3 })));
/// ```
pub fn drain<S>(source: &mut S, max_bytes: Option<NonZeroUsize>) -> Result<Bytes>
where
    S: StreamSource + ?Sized,
{
    let limit = max_bytes.map(NonZeroUsize::get);
    let mut acc = BytesMut::with_capacity(DRAIN_CHUNK_SIZE);

    loop {
        let want = match limit {
            Some(limit) => DRAIN_CHUNK_SIZE.min(limit.saturating_add(1) - acc.len()),
            None => DRAIN_CHUNK_SIZE,
        };

        let start = acc.len();
        acc.resize(start + want, 0);
        let pull = source.pull(&mut acc[start..])?;
        acc.truncate(start + pull.len);

        if let Some(limit) = limit {
            if acc.len() > limit {
                debug!(limit, "drain exceeded budget");
                return Err(StreamError::OutOfBudget { limit });
            }
        }

        if pull.is_exhausted() {
            debug!(bytes = acc.len(), "drained source");
            return Ok(acc.freeze());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{MemorySource, RepeatSource};

    #[test]
    fn test_drain_spans_many_chunks() {
        let data: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
        let out = drain(&mut MemorySource::new(data.clone()), None).unwrap();
        assert_eq!(&out[..], &data[..]);
    }

    #[test]
    fn test_drain_empty() {
        let out = drain(&mut MemorySource::new(Vec::new()), None).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_budget_exactly_met() {
        let budget = NonZeroUsize::new(10);
        let out = drain(&mut MemorySource::new(vec![1u8; 10]), budget).unwrap();
        assert_eq!(out.len(), 10);
    }

    #[test]
    fn test_budget_exceeded() {
        let budget = NonZeroUsize::new(3);
        let mut source = MemorySource::new(vec![1u8; 10]);
        assert!(matches!(
            drain(&mut source, budget),
            Err(StreamError::OutOfBudget { limit: 3 })
        ));
        // Fails fast: no more than budget + 1 bytes were pulled.
        assert_eq!(source.position(), 4);
    }

    #[test]
    fn test_budget_stops_unbounded_source() {
        let budget = NonZeroUsize::new(64 * 1024);
        let mut source = RepeatSource::new(&b"spin"[..]);
        assert!(matches!(
            drain(&mut source, budget),
            Err(StreamError::OutOfBudget { .. })
        ));
    }
}
