//! Framing for JSON values.

use serde::de::DeserializeOwned;

use super::{Format, Frame};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Kind {
    #[default]
    Container,
    Str,
    Scalar,
}

/// Finds the byte span of one JSON value without parsing it.
///
/// The scanner is resumable: when the buffer ends mid-value it remembers its
/// position, nesting depth and string/escape state, so the next call with a
/// longer buffer continues instead of rescanning. Positions are relative to
/// the start of the buffer, which must not shift until [`reset`](Self::reset).
///
/// Objects, arrays and strings are self-delimiting. Bare scalars (numbers,
/// `true`, `false`, `null`) end at whitespace, a structural character, or
/// the end of the stream.
#[derive(Debug, Clone, Default)]
pub struct JsonScanner {
    pos: usize,
    start: Option<usize>,
    depth: usize,
    in_string: bool,
    escaped: bool,
    kind: Kind,
}

impl JsonScanner {
    /// Create a scanner at the start of a buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all progress.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Scan `buf` for the next complete value.
    ///
    /// Returns `Ok(None)` if more bytes are needed or, when `at_end` is set,
    /// if only whitespace remains. A value cut off by the end of the stream
    /// is [`ParseError::Truncated`].
    pub fn scan(&mut self, buf: &[u8], at_end: bool) -> Result<Option<Frame>, ParseError> {
        let start = match self.start {
            Some(start) => start,
            None => {
                while self.pos < buf.len() && is_whitespace(buf[self.pos]) {
                    self.pos += 1;
                }
                if self.pos == buf.len() {
                    return Ok(None);
                }
                self.begin(buf[self.pos])
            }
        };

        let complete = match self.kind {
            Kind::Container | Kind::Str => self.scan_delimited(buf),
            Kind::Scalar => self.scan_scalar(buf, at_end),
        };

        if complete {
            Ok(Some(Frame {
                start,
                end: self.pos,
            }))
        } else if at_end {
            Err(ParseError::Truncated {
                buffered: buf.len() - start,
            })
        } else {
            Ok(None)
        }
    }

    /// Number of leading bytes consumed as whitespace, rebasing every
    /// position so the buffer may be advanced by that amount.
    pub fn take_skipped(&mut self) -> usize {
        let skipped = self.start.unwrap_or(self.pos);
        self.pos -= skipped;
        if let Some(start) = self.start.as_mut() {
            *start = 0;
        }
        skipped
    }

    fn begin(&mut self, first: u8) -> usize {
        let start = self.pos;
        self.start = Some(start);
        match first {
            b'{' | b'[' => {
                self.kind = Kind::Container;
                self.depth = 1;
                self.pos += 1;
            }
            b'"' => {
                self.kind = Kind::Str;
                self.in_string = true;
                self.pos += 1;
            }
            _ => self.kind = Kind::Scalar,
        }
        start
    }

    fn scan_delimited(&mut self, buf: &[u8]) -> bool {
        while self.pos < buf.len() {
            let b = buf[self.pos];
            self.pos += 1;

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if b == b'\\' {
                    self.escaped = true;
                } else if b == b'"' {
                    self.in_string = false;
                    if self.depth == 0 {
                        return true;
                    }
                }
                continue;
            }

            match b {
                b'"' => self.in_string = true,
                b'{' | b'[' => self.depth += 1,
                b'}' | b']' => {
                    self.depth = self.depth.saturating_sub(1);
                    if self.depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
        false
    }

    fn scan_scalar(&mut self, buf: &[u8], at_end: bool) -> bool {
        let start = self.start.unwrap_or(self.pos);

        // A stray structural byte is handed to the parser on its own to be rejected.
        if self.pos == start && is_structural(buf[start]) {
            self.pos += 1;
            return true;
        }

        while self.pos < buf.len() {
            let b = buf[self.pos];
            if is_whitespace(b) || is_structural(b) || b == b'"' {
                return true;
            }
            self.pos += 1;
        }
        at_end
    }
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

fn is_structural(b: u8) -> bool {
    matches!(b, b'{' | b'}' | b'[' | b']' | b',' | b':')
}

/// Concatenated JSON: values follow each other with optional whitespace.
///
/// Accepts `{"a":1}{"b":2}`, one value per line, or `1 2 3` alike.
#[derive(Debug, Clone, Default)]
pub struct JsonFormat {
    scanner: JsonScanner,
}

impl JsonFormat {
    /// Create the format.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Format for JsonFormat {
    fn frame(&mut self, buf: &[u8], at_end: bool) -> Result<Option<Frame>, ParseError> {
        self.scanner.scan(buf, at_end)
    }

    fn parse<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ParseError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn reset(&mut self) {
        self.scanner.reset();
    }

    fn take_skipped(&mut self) -> usize {
        self.scanner.take_skipped()
    }
}

/// JSON Lines: exactly one value per line, blank lines ignored.
#[derive(Debug, Clone, Default)]
pub struct JsonLinesFormat {
    line_start: usize,
    next_index: usize,
}

impl JsonLinesFormat {
    /// Create the format.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Format for JsonLinesFormat {
    fn frame(&mut self, buf: &[u8], at_end: bool) -> Result<Option<Frame>, ParseError> {
        while let Some(offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let end = self.next_index + offset + 1;
            let line = &buf[self.line_start..end];
            self.next_index = end;
            if line.iter().all(|b| is_whitespace(*b)) {
                self.line_start = end;
                continue;
            }
            return Ok(Some(Frame {
                start: self.line_start,
                end,
            }));
        }
        self.next_index = buf.len();

        let rest = &buf[self.line_start..];
        if at_end && !rest.iter().all(|b| is_whitespace(*b)) {
            return Ok(Some(Frame {
                start: self.line_start,
                end: buf.len(),
            }));
        }
        Ok(None)
    }

    fn parse<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, ParseError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn take_skipped(&mut self) -> usize {
        let skipped = self.line_start;
        self.line_start = 0;
        self.next_index -= skipped;
        skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(input: &[u8]) -> Vec<&[u8]> {
        let mut scanner = JsonScanner::new();
        let mut rest = input;
        let mut out = Vec::new();
        while let Some(frame) = scanner.scan(rest, true).unwrap() {
            out.push(&rest[frame.start..frame.end]);
            rest = &rest[frame.end..];
            scanner.reset();
        }
        out
    }

    #[test]
    fn test_concatenated_objects() {
        assert_eq!(
            spans(br#"{"a":1}{"b":2}"#),
            vec![&br#"{"a":1}"#[..], &br#"{"b":2}"#[..]]
        );
    }

    #[test]
    fn test_scalars_and_strings() {
        assert_eq!(
            spans(b" 12 true\n\"x y\"null [1,[2]] -3.5e2"),
            vec![
                &b"12"[..],
                &b"true"[..],
                &b"\"x y\""[..],
                &b"null"[..],
                &b"[1,[2]]"[..],
                &b"-3.5e2"[..],
            ]
        );
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let input = br#"{"k":"}{\"]"} 1"#;
        assert_eq!(spans(input)[0], &br#"{"k":"}{\"]"}"#[..]);
    }

    #[test]
    fn test_resumes_across_calls() {
        let input = br#"{"nested":{"s":"a\"b"}}"#;
        let mut scanner = JsonScanner::new();
        for cut in 1..input.len() {
            assert_eq!(scanner.scan(&input[..cut], false).unwrap(), None);
        }
        let frame = scanner.scan(input, false).unwrap().unwrap();
        assert_eq!(frame, Frame { start: 0, end: input.len() });
    }

    #[test]
    fn test_scalar_waits_for_delimiter() {
        let mut scanner = JsonScanner::new();
        assert_eq!(scanner.scan(b"123", false).unwrap(), None);
        assert_eq!(
            scanner.scan(b"1234 ", false).unwrap(),
            Some(Frame { start: 0, end: 4 })
        );
    }

    #[test]
    fn test_truncated_at_end() {
        let mut scanner = JsonScanner::new();
        match scanner.scan(b"  {\"a\":", true) {
            Err(ParseError::Truncated { buffered }) => assert_eq!(buffered, 5),
            other => panic!("Expected Truncated, got {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_at_end() {
        let mut scanner = JsonScanner::new();
        assert_eq!(scanner.scan(b" \r\n\t", true).unwrap(), None);
    }

    #[test]
    fn test_stray_closer_is_framed_alone() {
        assert_eq!(spans(b"}"), vec![&b"}"[..]]);
    }

    #[test]
    fn test_json_lines_skips_blank_lines() {
        let mut format = JsonLinesFormat::new();
        let buf = b"\n  \n{\"a\":1}\n";
        let frame = format.frame(buf, false).unwrap().unwrap();
        assert_eq!(&buf[frame.start..frame.end], b"{\"a\":1}\n");
        let value: serde_json::Value = format.parse(&buf[frame.start..frame.end]).unwrap();
        assert_eq!(value["a"], 1);
    }

    #[test]
    fn test_take_skipped_rebases_partial_value() {
        let mut scanner = JsonScanner::new();
        assert_eq!(scanner.scan(b"   [1, ", false).unwrap(), None);
        assert_eq!(scanner.take_skipped(), 3);
        assert_eq!(scanner.take_skipped(), 0);
        assert_eq!(
            scanner.scan(b"[1, 2]", false).unwrap(),
            Some(Frame { start: 0, end: 6 })
        );
    }

    #[test]
    fn test_take_skipped_whitespace_only() {
        let mut scanner = JsonScanner::new();
        assert_eq!(scanner.scan(b" \n\t ", false).unwrap(), None);
        assert_eq!(scanner.take_skipped(), 4);
        assert_eq!(
            scanner.scan(b"7 ", false).unwrap(),
            Some(Frame { start: 0, end: 1 })
        );
    }

    #[test]
    fn test_json_lines_take_skipped() {
        let mut format = JsonLinesFormat::new();
        assert_eq!(format.frame(b"\n\n{\"a\"", false).unwrap(), None);
        assert_eq!(format.take_skipped(), 2);
        assert_eq!(
            format.frame(b"{\"a\":1}\n", false).unwrap(),
            Some(Frame { start: 0, end: 8 })
        );
    }

    #[test]
    fn test_json_lines_final_line_without_newline() {
        let mut format = JsonLinesFormat::new();
        assert_eq!(format.frame(b"[1]", false).unwrap(), None);
        assert_eq!(
            format.frame(b"[1]", true).unwrap(),
            Some(Frame { start: 0, end: 3 })
        );
    }
}
