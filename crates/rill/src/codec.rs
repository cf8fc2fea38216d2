//! Codecs for Tokio framed I/O.
//!
//! The blocking components in this crate pull from a [`StreamSource`]. Async
//! callers instead drive a `tokio_util::codec::FramedRead` over any
//! `AsyncRead`; these codecs give them the same line splitting and JSON
//! framing.
//!
//! [`StreamSource`]: crate::StreamSource

use std::marker::PhantomData;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::codec::{Decoder, Encoder};

use crate::decode::{Format, Frame, JsonFormat, DEFAULT_MAX_VALUE_LEN};
use crate::error::{ParseError, Result, StreamError};
use crate::line::DEFAULT_MAX_LINE_LEN;

/// Delimiter-terminated line codec.
///
/// Decoded lines include the delimiter. At end of stream a final
/// unterminated line is yielded as-is.
#[derive(Debug, Clone)]
pub struct LineCodec {
    /// Index of next byte to check for the delimiter
    next_index: usize,
    delimiter: u8,
    max_len: usize,
}

impl LineCodec {
    /// Create a newline codec with the default maximum line length.
    pub fn new() -> Self {
        Self {
            next_index: 0,
            delimiter: b'\n',
            max_len: DEFAULT_MAX_LINE_LEN,
        }
    }

    /// Split on `delimiter` instead of `\n`.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the maximum line length, delimiter included.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }
}

impl Default for LineCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for LineCodec {
    type Item = Bytes;
    type Error = StreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        let delimiter = self.delimiter;
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == delimiter) {
            let len = self.next_index + offset + 1;
            self.next_index = 0;

            if len > self.max_len {
                return Err(StreamError::LineTooLong {
                    limit: self.max_len,
                });
            }
            Ok(Some(src.split_to(len).freeze()))
        } else {
            // No complete line yet - remember where we stopped
            self.next_index = src.len();

            if src.len() > self.max_len {
                return Err(StreamError::LineTooLong {
                    limit: self.max_len,
                });
            }
            Ok(None)
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if let Some(line) = self.decode(src)? {
            return Ok(Some(line));
        }
        self.next_index = 0;
        if src.is_empty() {
            Ok(None)
        } else {
            Ok(Some(src.split().freeze()))
        }
    }
}

impl Encoder<Bytes> for LineCodec {
    type Error = StreamError;

    /// Writes the line, adding the delimiter if it is missing.
    fn encode(&mut self, line: Bytes, dst: &mut BytesMut) -> Result<()> {
        dst.reserve(line.len() + 1);
        dst.extend_from_slice(&line);
        if line.last() != Some(&self.delimiter) {
            dst.put_u8(self.delimiter);
        }
        Ok(())
    }
}

/// Concatenated-JSON codec yielding values of type `T`.
///
/// Uses the same resumable scanner as [`Decoder`](crate::Decoder), so a value
/// split across many reads is scanned once. Encoding writes one compact JSON
/// value per line.
#[derive(Debug)]
pub struct JsonCodec<T> {
    format: JsonFormat,
    max_len: usize,
    _shape: PhantomData<fn() -> T>,
}

impl<T> JsonCodec<T> {
    /// Create a codec with the default maximum value length.
    pub fn new() -> Self {
        Self {
            format: JsonFormat::new(),
            max_len: DEFAULT_MAX_VALUE_LEN,
            _shape: PhantomData,
        }
    }

    /// Set the largest encoded value accepted.
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len.max(1);
        self
    }
}

impl<T> Default for JsonCodec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> JsonCodec<T> {
    fn take(&mut self, src: &mut BytesMut, frame: Frame) -> Result<T> {
        if frame.end - frame.start > self.max_len {
            return Err(StreamError::ValueTooLong {
                limit: self.max_len,
            });
        }
        let value = self.format.parse(&src[frame.start..frame.end])?;
        src.advance(frame.end);
        self.format.reset();
        Ok(value)
    }
}

impl<T: DeserializeOwned> Decoder for JsonCodec<T> {
    type Item = T;
    type Error = StreamError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        if let Some(frame) = self.format.frame(&src[..], false)? {
            return self.take(src, frame).map(Some);
        }

        src.advance(self.format.take_skipped());
        if src.len() > self.max_len {
            return Err(StreamError::ValueTooLong {
                limit: self.max_len,
            });
        }
        Ok(None)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        match self.format.frame(&src[..], true)? {
            Some(frame) => self.take(src, frame).map(Some),
            None => {
                // Only whitespace is left.
                src.clear();
                self.format.reset();
                Ok(None)
            }
        }
    }
}

impl<T: Serialize> Encoder<T> for JsonCodec<T> {
    type Error = StreamError;

    fn encode(&mut self, value: T, dst: &mut BytesMut) -> Result<()> {
        let json = serde_json::to_vec(&value).map_err(ParseError::from)?;
        dst.reserve(json.len() + 1);
        dst.extend_from_slice(&json);
        dst.put_u8(b'\n');
        Ok(())
    }
}
