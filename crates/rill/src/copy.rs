//! Move bytes from a source to a sink without holding the whole stream.

use tracing::debug;

use crate::error::{CopyError, StreamError};
use crate::sink::StreamSink;
use crate::source::StreamSource;

/// Chunk size used by callers without a preference.
pub const DEFAULT_COPY_CHUNK_SIZE: usize = 8 * 1024;

/// Copy everything from `source` into `sink`, `chunk_size` bytes at a time.
///
/// Memory use is one `chunk_size` buffer regardless of stream length. Each
/// pulled chunk is pushed whole: a sink that accepts fewer bytes fails the
/// copy with [`StreamError::WriteShortfall`]. Source and sink failures stop
/// the copy immediately; the returned [`CopyError`] says how many bytes had
/// already been delivered. The sink is flushed once the source is exhausted.
///
/// Returns the total number of bytes copied.
///
/// ```rust
/// use rill::{copy, MemorySink, TextSource};
///
/// let mut sink = MemorySink::new();
/// let copied = copy(&mut TextSource::new("streamed"), &mut sink, 3).unwrap();
/// assert_eq!(copied, 8);
/// assert_eq!(sink.as_slice(), b"streamed");
/// ```
pub fn copy<S, K>(source: &mut S, sink: &mut K, chunk_size: usize) -> Result<u64, CopyError>
where
    S: StreamSource + ?Sized,
    K: StreamSink + ?Sized,
{
    let mut copied: u64 = 0;
    if chunk_size == 0 {
        return Err(CopyError {
            copied,
            source: StreamError::ZeroCapacity,
        });
    }

    let mut chunk = vec![0u8; chunk_size];
    loop {
        let pull = source
            .pull(&mut chunk)
            .map_err(|source| CopyError { copied, source })?;

        if pull.len > 0 {
            let accepted = sink
                .push(&chunk[..pull.len])
                .map_err(|source| CopyError { copied, source })?;
            copied += accepted.min(pull.len) as u64;
            if accepted < pull.len {
                return Err(CopyError {
                    copied,
                    source: StreamError::WriteShortfall {
                        accepted,
                        requested: pull.len,
                    },
                });
            }
        }

        if pull.is_exhausted() {
            sink.flush().map_err(|source| CopyError { copied, source })?;
            debug!(bytes = copied, chunk_size, "copy complete");
            return Ok(copied);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::sink::MemorySink;
    use crate::source::{MemorySource, Pull, RepeatSource};
    use std::io;

    /// Accepts up to `room` bytes in total.
    struct CappedSink {
        data: Vec<u8>,
        room: usize,
    }

    impl StreamSink for CappedSink {
        fn push(&mut self, buf: &[u8]) -> Result<usize> {
            let n = buf.len().min(self.room - self.data.len());
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }
    }

    /// Delivers `good` bytes, then fails.
    struct FailAfter {
        good: usize,
        sent: usize,
    }

    impl StreamSource for FailAfter {
        fn pull(&mut self, buf: &mut [u8]) -> Result<Pull> {
            if self.sent >= self.good {
                return Err(StreamError::Source(io::Error::new(
                    io::ErrorKind::ConnectionAborted,
                    "peer aborted",
                )));
            }
            let n = buf.len().min(self.good - self.sent);
            buf[..n].fill(b'.');
            self.sent += n;
            Ok(Pull::ongoing(n))
        }
    }

    #[test]
    fn test_copy_all_chunk_sizes() {
        let data = b"the quick brown fox".to_vec();
        for chunk in 1..=data.len() + 10 {
            let mut sink = MemorySink::new();
            let copied = copy(&mut MemorySource::new(data.clone()), &mut sink, chunk).unwrap();
            assert_eq!(copied, data.len() as u64);
            assert_eq!(sink.as_slice(), &data[..]);
        }
    }

    #[test]
    fn test_zero_chunk_size() {
        let mut sink = MemorySink::new();
        let err = copy(&mut MemorySource::new(vec![1u8]), &mut sink, 0).unwrap_err();
        assert_eq!(err.copied, 0);
        assert!(matches!(err.source, StreamError::ZeroCapacity));
    }

    #[test]
    fn test_source_failure_keeps_count() {
        let mut sink = MemorySink::new();
        let mut source = FailAfter { good: 10, sent: 0 };
        let err = copy(&mut source, &mut sink, 4).unwrap_err();
        assert_eq!(err.copied, 10);
        assert!(matches!(err.source, StreamError::Source(_)));
        assert_eq!(sink.as_slice().len(), 10);
    }

    #[test]
    fn test_write_shortfall() {
        let mut sink = CappedSink {
            data: Vec::new(),
            room: 5,
        };
        let err = copy(&mut MemorySource::new(vec![9u8; 8]), &mut sink, 4).unwrap_err();
        assert_eq!(err.copied, 5);
        match err.source {
            StreamError::WriteShortfall {
                accepted,
                requested,
            } => {
                assert_eq!(accepted, 1);
                assert_eq!(requested, 4);
            }
            other => panic!("Expected WriteShortfall, got {:?}", other),
        }
    }

    #[test]
    fn test_large_bounded_stream() {
        let total = 3 * 1024 * 1024;
        let mut source = RepeatSource::bounded(&b"0123456789"[..], total);
        let mut sink = CappedSink {
            data: Vec::new(),
            room: usize::MAX,
        };
        let copied = copy(&mut source, &mut sink, DEFAULT_COPY_CHUNK_SIZE).unwrap();
        assert_eq!(copied, total);
        assert_eq!(sink.data.len() as u64, total);
    }
}
