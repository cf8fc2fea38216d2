//! Opening origins as byte sources.
//!
//! An origin argument names where the bytes come from:
//! - `-`: standard input
//! - `http://...` / `https://...`: the body of a GET request
//! - `text:LITERAL`: the literal text after the prefix
//! - anything else: a file path

use std::fs::File;
use std::io;
use std::path::PathBuf;

use rill::{PassthroughSource, StreamSource, TextSource};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::HttpConfig;

/// Errors raised while opening an origin.
#[derive(Debug, Error)]
pub enum OriginError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {url} returned {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

impl OriginError {
    /// Get a static error code string for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Open { .. } => "open_failed",
            Self::Client(_) => "client_failed",
            Self::Request { .. } => "request_failed",
            Self::Status { .. } => "bad_status",
        }
    }
}

/// A parsed origin argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Stdin,
    Http(String),
    Text(String),
    File(PathBuf),
}

impl Origin {
    pub fn parse(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Http(arg.to_string())
        } else if let Some(text) = arg.strip_prefix("text:") {
            Self::Text(text.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Open the origin. Files and HTTP bodies are streamed, never read whole.
    pub fn open(&self, http: &HttpConfig) -> Result<Box<dyn StreamSource>, OriginError> {
        match self {
            Self::Stdin => {
                debug!("reading from stdin");
                Ok(Box::new(PassthroughSource::new(io::stdin())))
            }
            Self::Text(text) => Ok(Box::new(TextSource::new(text.as_str()))),
            Self::File(path) => {
                let file = File::open(path).map_err(|source| OriginError::Open {
                    path: path.clone(),
                    source,
                })?;
                debug!(path = %path.display(), "opened file");
                Ok(Box::new(PassthroughSource::new(file)))
            }
            Self::Http(url) => {
                let response = fetch(url, http)?;
                Ok(Box::new(PassthroughSource::new(response)))
            }
        }
    }
}

fn fetch(url: &str, http: &HttpConfig) -> Result<reqwest::blocking::Response, OriginError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(http.timeout())
        .user_agent(http.user_agent.as_str())
        .build()
        .map_err(OriginError::Client)?;

    let response = client
        .get(url)
        .send()
        .map_err(|source| OriginError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(OriginError::Status {
            url: url.to_string(),
            status,
        });
    }
    info!(
        url = %url,
        status = status.as_u16(),
        length = ?response.content_length(),
        "streaming response body"
    );
    Ok(response)
}
