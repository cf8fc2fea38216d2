//! Incremental decoding of self-delimiting values from a [`StreamSource`].
//!
//! [`Decoder`] pulls only as many bytes as it needs to complete the next
//! value, hands that span to a pluggable [`Format`], and keeps any trailing
//! bytes buffered for the next call. The whole input is never materialized.
//!
//! ```rust
//! use rill::{Decoder, TextSource};
//! use serde_json::json;
//!
//! let mut decoder = Decoder::new(TextSource::new(r#"{"a":1}{"b":2}"#));
//! assert_eq!(decoder.decode_value().unwrap(), Some(json!({"a": 1})));
//! assert_eq!(decoder.decode_value().unwrap(), Some(json!({"b": 2})));
//! assert_eq!(decoder.decode_value().unwrap(), None);
//! ```

mod json;

pub use json::{JsonFormat, JsonLinesFormat, JsonScanner};

use std::marker::PhantomData;

use bytes::{Buf, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{Latch, ParseError, Result, StreamError};
use crate::source::StreamSource;

/// Default cap on the encoded size of a single value.
pub const DEFAULT_MAX_VALUE_LEN: usize = 8 * 1024 * 1024;

/// Default number of bytes requested per refill.
pub const DEFAULT_DECODE_CHUNK_SIZE: usize = 8 * 1024;

/// Byte span of one complete value inside a buffer.
///
/// The value is `buf[start..end]`; everything before `end` is consumed once
/// the value is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// First byte of the value (leading separators skipped).
    pub start: usize,
    /// One past the last byte of the value.
    pub end: usize,
}

/// A self-delimiting, position-resumable value grammar.
pub trait Format {
    /// Locate the next complete value in `buf`.
    ///
    /// `Ok(None)` means more bytes are needed, or, when `at_end` is set, that
    /// no further value exists. A value cut off by the end of the stream must
    /// be reported as [`ParseError::Truncated`]. The buffer only grows between
    /// calls until [`reset`](Self::reset), so implementations may keep scan
    /// progress.
    fn frame(&mut self, buf: &[u8], at_end: bool) -> Result<Option<Frame>, ParseError>;

    /// Convert a located value into the requested shape.
    fn parse<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ParseError>;

    /// Forget scan progress after a frame has been consumed.
    fn reset(&mut self) {}

    /// Report how many leading bytes are known to be separators and rebase
    /// scan progress as if the buffer started that many bytes later.
    ///
    /// Called after [`frame`](Self::frame) returns `Ok(None)`; the caller
    /// drops the returned count from the front of the buffer so separators
    /// never count against a value's size limit. Defaults to 0.
    fn take_skipped(&mut self) -> usize {
        0
    }
}

/// Decodes a stream of values one at a time.
///
/// The type requested from [`decode_next`](Self::decode_next) only decides
/// how a located value is converted; which bytes make up the value is decided
/// by the [`Format`] alone. A failed decode leaves the bytes of earlier values
/// consumed and the failing value buffered, and is terminal: later calls
/// return [`StreamError::Terminated`].
#[derive(Debug)]
pub struct Decoder<S, F = JsonFormat> {
    source: S,
    format: F,
    buf: BytesMut,
    chunk_size: usize,
    max_value_len: usize,
    source_done: bool,
    decoded: u64,
    latch: Latch,
}

impl<S: StreamSource> Decoder<S, JsonFormat> {
    /// Decode concatenated JSON values from `source`.
    pub fn new(source: S) -> Self {
        Self::with_format(source, JsonFormat::new())
    }
}

impl<S: StreamSource, F: Format> Decoder<S, F> {
    /// Decode values of `format` from `source`.
    pub fn with_format(source: S, format: F) -> Self {
        Self {
            source,
            format,
            buf: BytesMut::new(),
            chunk_size: DEFAULT_DECODE_CHUNK_SIZE,
            max_value_len: DEFAULT_MAX_VALUE_LEN,
            source_done: false,
            decoded: 0,
            latch: Latch::default(),
        }
    }

    /// Set how many bytes each refill asks the source for; at least 1.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the largest encoded value accepted; at least 1.
    pub fn with_max_value_len(mut self, max_value_len: usize) -> Self {
        self.max_value_len = max_value_len.max(1);
        self
    }

    /// Bytes pulled from the source but not yet consumed.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Number of values decoded so far.
    pub fn decoded(&self) -> u64 {
        self.decoded
    }

    /// Consume the decoder, returning the source and any unconsumed bytes.
    pub fn into_inner(self) -> (S, Bytes) {
        (self.source, self.buf.freeze())
    }

    /// Decode the next value as `T`.
    ///
    /// Returns `Ok(None)` once the stream is exhausted, and on every call
    /// after that.
    pub fn decode_next<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        self.latch.check()?;
        let result = self.next_value();
        self.latch.guard("decoder", result)
    }

    /// Decode the next value without a target shape.
    pub fn decode_value(&mut self) -> Result<Option<serde_json::Value>> {
        self.decode_next()
    }

    /// Iterate over the remaining values as `T`.
    pub fn values<T: DeserializeOwned>(&mut self) -> Values<'_, S, F, T> {
        Values {
            decoder: self,
            done: false,
            _shape: PhantomData,
        }
    }

    fn next_value<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(frame) = self.format.frame(&self.buf, self.source_done)? {
                if frame.end - frame.start > self.max_value_len {
                    return Err(StreamError::ValueTooLong {
                        limit: self.max_value_len,
                    });
                }

                let value = self.format.parse(&self.buf[frame.start..frame.end])?;
                self.buf.advance(frame.end);
                self.format.reset();
                self.decoded += 1;
                return Ok(Some(value));
            }

            if self.source_done {
                return Ok(None);
            }

            let skipped = self.format.take_skipped();
            self.buf.advance(skipped);

            if self.buf.len() > self.max_value_len {
                return Err(StreamError::ValueTooLong {
                    limit: self.max_value_len,
                });
            }

            self.fill()?;
        }
    }

    fn fill(&mut self) -> Result<()> {
        let start = self.buf.len();
        let room = self.max_value_len.saturating_add(1) - start;
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
            debug!(
                decoded = self.decoded,
                buffered = self.buf.len(),
                "decoder source exhausted"
            );
            self.source_done = true;
        }
        Ok(())
    }
}

/// Iterator over the values of a [`Decoder`], stopping after the first error.
#[derive(Debug)]
pub struct Values<'a, S, F, T> {
    decoder: &'a mut Decoder<S, F>,
    done: bool,
    _shape: PhantomData<fn() -> T>,
}

impl<S, F, T> Iterator for Values<'_, S, F, T>
where
    S: StreamSource,
    F: Format,
    T: DeserializeOwned,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.decoder.decode_next() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
