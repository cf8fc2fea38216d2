//! Subcommand implementations.
//!
//! Each command drives one component of the streaming core and writes its
//! output through a [`WriterSink`]. Diagnostics go to the log, never to the
//! output.

use std::io::Write;

use anyhow::{Context, Result};
use rill::{
    copy, drain, Decoder, Format, JsonFormat, JsonLinesFormat, LineReader, StreamError,
    StreamSink, StreamSource, WriterSink,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::cli::Command;
use crate::config::StreamConfig;

/// Run `command` over `source`, writing results to `out`.
pub fn run<S, W>(command: &Command, source: &mut S, config: &StreamConfig, out: W) -> Result<()>
where
    S: StreamSource + ?Sized,
    W: Write,
{
    let mut sink = WriterSink::new(out);
    match command {
        Command::Cat { .. } => cat(source, config, &mut sink)?,
        Command::Lines { .. } => lines(source, config, &mut sink)?,
        Command::Drain { .. } => drain_all(source, config, &mut sink)?,
        Command::Json { lines: false, .. } => {
            let decoder = Decoder::with_format(source, JsonFormat::new());
            json(decoder, config, &mut sink)?
        }
        Command::Json { lines: true, .. } => {
            let decoder = Decoder::with_format(source, JsonLinesFormat::new());
            json(decoder, config, &mut sink)?
        }
    }
    sink.flush().context("failed to flush output")
}

/// Push all of `bytes`, treating a partial write as a failure.
fn emit<K: StreamSink + ?Sized>(sink: &mut K, bytes: &[u8]) -> rill::Result<()> {
    let accepted = sink.push(bytes)?;
    if accepted < bytes.len() {
        return Err(StreamError::WriteShortfall {
            accepted,
            requested: bytes.len(),
        });
    }
    Ok(())
}

fn cat<S, K>(source: &mut S, config: &StreamConfig, sink: &mut K) -> Result<()>
where
    S: StreamSource + ?Sized,
    K: StreamSink,
{
    let copied = copy(source, sink, config.chunk_size)?;
    info!(bytes = copied, "copy complete");
    Ok(())
}

fn lines<S, K>(source: &mut S, config: &StreamConfig, sink: &mut K) -> Result<()>
where
    S: StreamSource + ?Sized,
    K: StreamSink,
{
    let delimiter = config.delimiter_byte();
    let mut reader = LineReader::new(source)
        .with_delimiter(delimiter)
        .with_max_line_len(config.max_line_len)
        .with_chunk_size(config.chunk_size);

    let mut count = 0u64;
    for line in reader.lines() {
        let line = line.with_context(|| format!("failed to read line {}", count + 1))?;
        count += 1;

        let content = line.strip_suffix(&[delimiter]).unwrap_or(&line[..]);
        emit(sink, format!("{count}\t").as_bytes())?;
        emit(sink, content)?;
        emit(sink, b"\n")?;
    }
    info!(lines = count, "line read complete");
    Ok(())
}

fn drain_all<S, K>(source: &mut S, config: &StreamConfig, sink: &mut K) -> Result<()>
where
    S: StreamSource + ?Sized,
    K: StreamSink,
{
    let data = drain(source, config.drain_budget()).context("failed to drain origin")?;
    emit(sink, format!("{} bytes\n", data.len()).as_bytes())?;

    match std::str::from_utf8(&data) {
        Ok(text) => {
            emit(sink, text.as_bytes())?;
            if !text.is_empty() && !text.ends_with('\n') {
                emit(sink, b"\n")?;
            }
        }
        Err(e) => warn!(error = %e, "content is not valid UTF-8, not printing it"),
    }
    Ok(())
}

fn json<S, F, K>(mut decoder: Decoder<S, F>, config: &StreamConfig, sink: &mut K) -> Result<()>
where
    S: StreamSource,
    F: Format,
    K: StreamSink,
{
    decoder = decoder
        .with_chunk_size(config.chunk_size)
        .with_max_value_len(config.max_value_len);

    for value in decoder.values::<Value>() {
        let value = value.context("failed to decode value")?;
        let mut encoded = serde_json::to_vec(&value)?;
        encoded.push(b'\n');
        emit(sink, &encoded)?;
    }
    info!(values = decoder.decoded(), "decode complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;
    use rill::{PassthroughSource, TextSource};

    /// Parse a command line whose origin is ignored by the test.
    fn command(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("rillcat").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    fn run_text(command: Command, text: &str, config: &StreamConfig) -> Result<String> {
        let mut out = Vec::new();
        run(&command, &mut TextSource::new(text), config, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cat_copies_everything() {
        let config = StreamConfig {
            chunk_size: 3,
            ..StreamConfig::default()
        };
        let out = run_text(command(&["cat", "-"]), "copy me exactly", &config).unwrap();
        assert_eq!(out, "copy me exactly");
    }

    #[test]
    fn test_lines_are_numbered() {
        let out = run_text(
            command(&["lines", "-"]),
            "alpha\n\ngamma",
            &StreamConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "1\talpha\n2\t\n3\tgamma\n");
    }

    #[test]
    fn test_lines_custom_delimiter() {
        let config = StreamConfig {
            delimiter: ";".to_string(),
            ..StreamConfig::default()
        };
        let out = run_text(command(&["lines", "-"]), "a;b;", &config).unwrap();
        assert_eq!(out, "1\ta\n2\tb\n");
    }

    #[test]
    fn test_lines_too_long() {
        let config = StreamConfig {
            max_line_len: 4,
            ..StreamConfig::default()
        };
        let err =
            run_text(command(&["lines", "-"]), "ok\nmuch too long\n", &config).unwrap_err();
        assert!(err.to_string().contains("line 2"));
        assert!(matches!(
            err.downcast_ref::<StreamError>(),
            Some(StreamError::LineTooLong { limit: 4 })
        ));
    }

    #[test]
    fn test_drain_prints_size_and_text() {
        let out =
            run_text(command(&["drain", "-"]), "hello", &StreamConfig::default()).unwrap();
        assert_eq!(out, "5 bytes\nhello\n");
    }

    #[test]
    fn test_drain_binary_prints_size_only() {
        let mut out = Vec::new();
        let mut source = PassthroughSource::new(&[0xff, 0xfe, 0x00][..]);
        let drain = command(&["drain", "-"]);
        run(&drain, &mut source, &StreamConfig::default(), &mut out).unwrap();
        assert_eq!(out, b"3 bytes\n");
    }

    #[test]
    fn test_drain_over_budget() {
        let config = StreamConfig {
            max_drain_bytes: Some(4),
            ..StreamConfig::default()
        };
        let err = run_text(command(&["drain", "-"]), "too many bytes", &config).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StreamError>(),
            Some(StreamError::OutOfBudget { limit: 4 })
        ));
    }

    #[test]
    fn test_json_concatenated() {
        let out = run_text(
            command(&["json", "-"]),
            r#"{"a": 1} [true, null]  "s""#,
            &StreamConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "{\"a\":1}\n[true,null]\n\"s\"\n");
    }

    #[test]
    fn test_json_lines() {
        let out = run_text(
            command(&["json", "--lines", "-"]),
            "{\"n\": 1}\n\n{\"n\": 2}\n",
            &StreamConfig::default(),
        )
        .unwrap();
        assert_eq!(out, "{\"n\":1}\n{\"n\":2}\n");
    }

    #[test]
    fn test_json_syntax_error_after_good_values() {
        let mut out = Vec::new();
        let result = run(
            &command(&["json", "-"]),
            &mut TextSource::new(r#"{"ok":1} {"bad":}"#),
            &StreamConfig::default(),
            &mut out,
        );
        assert!(result.is_err());
        // Values decoded before the failure were already written.
        assert_eq!(out, b"{\"ok\":1}\n");
    }
}
