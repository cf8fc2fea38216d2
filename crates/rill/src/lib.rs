//! # rill
//!
//! A small, composable streaming I/O core.
//!
//! ## Features
//!
//! - [`StreamSource`] / [`StreamSink`]: pull-based source and append-only sink
//!   contracts, with adapters for memory, strings, any `std::io::Read` or
//!   `std::io::Write`, and a read/write in-memory queue
//! - [`LineReader`]: delimiter-split lines with a bounded buffer
//! - [`drain`]: read a whole source into memory under an optional budget
//! - [`copy`]: move a source into a sink in fixed-size chunks
//! - [`Decoder`]: decode concatenated JSON (or any [`Format`]) one value at a
//!   time without holding the whole input
//! - Optional Tokio codecs for the same framing (`tokio` feature)
//!
//! Every component reports end of data separately from failure, and once a
//! component fails it keeps failing: there is no silent recovery.
//!
//! ## Quick Start
//!
//! ```rust
//! use rill::{copy, LineReader, MemorySink, TextSource};
//!
//! // Line by line
//! let mut reader = LineReader::new(TextSource::new("one\ntwo\n"));
//! for line in reader.lines() {
//!     let line = line.unwrap();
//!     assert!(line.ends_with(b"\n"));
//! }
//!
//! // Chunked copy into a sink
//! let mut sink = MemorySink::new();
//! let copied = copy(&mut TextSource::new("payload"), &mut sink, 4).unwrap();
//! assert_eq!(copied, 7);
//! ```
//!
//! ## Blocking model
//!
//! Pulls and pushes are direct blocking calls. Each source or sink allows a
//! single operation in flight, which `&mut self` enforces; components add no
//! locking and impose no timeouts of their own.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod buffer;
#[cfg(feature = "tokio")]
pub mod codec;
pub mod copy;
pub mod decode;
pub mod drain;
pub mod error;
pub mod line;
pub mod sink;
pub mod source;

pub use self::buffer::BufferStream;
pub use self::copy::{copy, DEFAULT_COPY_CHUNK_SIZE};
pub use self::decode::{
    Decoder, Format, Frame, JsonFormat, JsonLinesFormat, JsonScanner, Values,
    DEFAULT_MAX_VALUE_LEN,
};
pub use self::drain::{drain, DRAIN_CHUNK_SIZE};
pub use self::error::{CopyError, ParseError, Result, StreamError};
pub use self::line::{Line, LineReader, Lines, DEFAULT_MAX_LINE_LEN};
pub use self::sink::{MemorySink, StreamSink, WriterSink};
pub use self::source::{
    MemorySource, PassthroughSource, Pull, PullStatus, RepeatSource, StreamSource, TextSource,
};

#[cfg(feature = "tokio")]
pub use self::codec::{JsonCodec, LineCodec};
