//! Append-only byte sinks.

use std::io::{self, Write};

use crate::error::{Latch, Result, StreamError};

/// Something bytes can be appended to.
///
/// `push` returns how many bytes the sink accepted. Accepting fewer than
/// offered is not an error at this level; [`copy`](crate::copy()) reports it
/// as [`StreamError::WriteShortfall`]. Like sources, a sink error is terminal.
pub trait StreamSink {
    /// Append `buf`, returning the number of bytes accepted.
    fn push(&mut self, buf: &[u8]) -> Result<usize>;

    /// Flush anything the sink holds back. Defaults to a no-op.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<K: StreamSink + ?Sized> StreamSink for &mut K {
    #[inline]
    fn push(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).push(buf)
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

impl<K: StreamSink + ?Sized> StreamSink for Box<K> {
    #[inline]
    fn push(&mut self, buf: &[u8]) -> Result<usize> {
        (**self).push(buf)
    }

    #[inline]
    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }
}

/// Adapts a [`Write`] destination (stdout, a file, a socket).
///
/// Keeps writing until the whole buffer is taken or the writer returns
/// `Ok(0)`, in which case the short count is reported to the caller. A write
/// error after part of the buffer was taken is reported the same way: the
/// push returns the count delivered and the error is replayed on the next
/// call.
#[derive(Debug)]
pub struct WriterSink<W> {
    writer: W,
    latch: Latch,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            latch: Latch::default(),
        }
    }

    /// Borrow the writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the adapter and return the writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_fully(&mut self, buf: &[u8]) -> Result<usize> {
        let mut written = 0;
        while written < buf.len() {
            match self.writer.write(&buf[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if written == 0 => return Err(StreamError::Sink(e)),
                Err(e) => {
                    self.latch.trip("writer_sink", &StreamError::Sink(e));
                    break;
                }
            }
        }
        Ok(written)
    }
}

impl<W: Write> StreamSink for WriterSink<W> {
    fn push(&mut self, buf: &[u8]) -> Result<usize> {
        self.latch.check()?;
        let result = self.write_fully(buf);
        self.latch.guard("writer_sink", result)
    }

    fn flush(&mut self) -> Result<()> {
        self.latch.check()?;
        let result = self.writer.flush().map_err(StreamError::Sink);
        self.latch.guard("writer_sink", result)
    }
}

/// Collects everything pushed into a `Vec<u8>`.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    data: Vec<u8>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes collected so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consume the sink and return the collected bytes.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl StreamSink for MemorySink {
    fn push(&mut self, buf: &[u8]) -> Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }
}
