//! Buffered, line-oriented reading over a [`StreamSource`].
//!
//! [`LineReader`] splits a byte stream on a delimiter byte (newline by
//! default). Returned lines include the delimiter when one was present, so
//! concatenating every line reproduces the stream exactly.

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::error::{Latch, Result, StreamError};
use crate::source::{PullStatus, StreamSource};

/// Default maximum line length, delimiter included.
pub const DEFAULT_MAX_LINE_LEN: usize = 64 * 1024;

/// Default number of bytes requested per refill.
pub const DEFAULT_LINE_CHUNK_SIZE: usize = 8 * 1024;

/// One line returned by [`LineReader::read_line`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// The line bytes, including the delimiter if one was found.
    pub bytes: Bytes,
    /// `Exhausted` for the final partial line and every call after it.
    pub status: PullStatus,
}

impl Line {
    /// Returns `true` if the stream has no lines after this one.
    pub fn is_exhausted(&self) -> bool {
        self.status == PullStatus::Exhausted
    }

    /// Length in bytes, delimiter included.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the line holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Presents a byte source as discrete lines.
///
/// The internal buffer never holds more than `max_line_len + 1` bytes; a line
/// longer than the limit fails with [`StreamError::LineTooLong`]. Any failure
/// is terminal for the reader.
///
/// ```rust
/// use rill::{LineReader, PullStatus, TextSource};
///
/// let mut reader = LineReader::new(TextSource::new("a\nb"));
///
/// let line = reader.read_line().unwrap();
/// assert_eq!(&line.bytes[..], b"a\n");
/// assert_eq!(line.status, PullStatus::Ongoing);
///
/// let line = reader.read_line().unwrap();
/// assert_eq!(&line.bytes[..], b"b");
/// assert_eq!(line.status, PullStatus::Exhausted);
/// ```
#[derive(Debug)]
pub struct LineReader<S> {
    source: S,
    buf: BytesMut,
    /// Index of next byte to check for the delimiter
    next_index: usize,
    delimiter: u8,
    max_line_len: usize,
    chunk_size: usize,
    source_done: bool,
    latch: Latch,
}

impl<S: StreamSource> LineReader<S> {
    /// Create a newline-delimited reader with default limits.
    pub fn new(source: S) -> Self {
        Self {
            source,
            buf: BytesMut::new(),
            next_index: 0,
            delimiter: b'\n',
            max_line_len: DEFAULT_MAX_LINE_LEN,
            chunk_size: DEFAULT_LINE_CHUNK_SIZE,
            source_done: false,
            latch: Latch::default(),
        }
    }

    /// Split on `delimiter` instead of `\n`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the maximum line length (delimiter included); at least 1.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len.max(1);
        self
    }

    /// Set how many bytes each refill asks the source for; at least 1.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// The delimiter byte.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Bytes pulled from the source but not yet returned.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Consume the reader, returning the source and any unreturned bytes.
    pub fn into_inner(self) -> (S, Bytes) {
        (self.source, self.buf.freeze())
    }

    /// Read the next line.
    ///
    /// Lines ending in the delimiter come back with [`PullStatus::Ongoing`].
    /// When the source is exhausted the remaining bytes (possibly none) come
    /// back with [`PullStatus::Exhausted`], and every later call returns an
    /// empty `Exhausted` line.
    pub fn read_line(&mut self) -> Result<Line> {
        self.latch.check()?;
        let result = self.next_line();
        self.latch.guard("line_reader", result)
    }

    /// Iterate over the remaining lines.
    pub fn lines(&mut self) -> Lines<'_, S> {
        Lines {
            reader: self,
            done: false,
        }
    }

    fn next_line(&mut self) -> Result<Line> {
        let delimiter = self.delimiter;
        loop {
            // Look for the delimiter starting from where we left off
            if let Some(offset) = self.buf[self.next_index..]
                .iter()
                .position(|b| *b == delimiter)
            {
                let len = self.next_index + offset + 1;
                self.next_index = 0;

                if len > self.max_line_len {
                    return Err(StreamError::LineTooLong {
                        limit: self.max_line_len,
                    });
                }

                return Ok(Line {
                    bytes: self.buf.split_to(len).freeze(),
                    status: PullStatus::Ongoing,
                });
            }

            self.next_index = self.buf.len();

            // Everything buffered belongs to one unterminated line
            if self.buf.len() > self.max_line_len {
                return Err(StreamError::LineTooLong {
                    limit: self.max_line_len,
                });
            }

            if self.source_done {
                self.next_index = 0;
                return Ok(Line {
                    bytes: self.buf.split().freeze(),
                    status: PullStatus::Exhausted,
                });
            }

            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<()> {
        let start = self.buf.len();
        let room = self.max_line_len.saturating_add(1) - start;
        let want = self.chunk_size.min(room);

        self.buf.resize(start + want, 0);
        let pull = match self.source.pull(&mut self.buf[start..]) {
            Ok(pull) => pull,
            Err(e) => {
                self.buf.truncate(start);
                return Err(e);
            }
        };
        self.buf.truncate(start + pull.len);

        if pull.is_exhausted() {
            debug!(buffered = self.buf.len(), "line source exhausted");
            self.source_done = true;
        }
        Ok(())
    }
}

/// Iterator over the lines of a [`LineReader`].
///
/// Yields each line's bytes, skips the empty terminal line, and stops after
/// the first error.
#[derive(Debug)]
pub struct Lines<'a, S> {
    reader: &'a mut LineReader<S>,
    done: bool,
}

impl<S: StreamSource> Iterator for Lines<'_, S> {
    type Item = Result<Bytes>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.read_line() {
            Ok(line) => {
                if line.is_exhausted() {
                    self.done = true;
                    if line.is_empty() {
                        return None;
                    }
                }
                Some(Ok(line.bytes))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<S: StreamSource> std::iter::FusedIterator for Lines<'_, S> {}
