//! Test runner for the rillcat binary.
//!
//! Builds a command line, writes any config or input files into a temporary
//! directory, and captures the process output.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tempfile::TempDir;

/// Output of one rillcat run.
#[derive(Debug)]
pub struct RunOutput {
    pub success: bool,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

impl RunOutput {
    /// Stdout as UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// A rillcat invocation under construction.
pub struct Rillcat {
    dir: TempDir,
    args: Vec<String>,
    stdin: Option<Vec<u8>>,
}

#[allow(dead_code)]
impl Rillcat {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
            args: Vec::new(),
            stdin: None,
        })
    }

    /// Write `content` to a file in the temp dir and return its path.
    pub fn file(&self, name: &str, content: &[u8]) -> anyhow::Result<PathBuf> {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Write a config file and pass it with `--config`.
    pub fn config(mut self, toml: &str) -> anyhow::Result<Self> {
        let path = self.file("rillcat.toml", toml.as_bytes())?;
        self.args.push("--config".to_string());
        self.args.push(path.display().to_string());
        Ok(self)
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn stdin(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(data.into());
        self
    }

    pub fn run(self) -> anyhow::Result<RunOutput> {
        let mut child = Command::new(env!("CARGO_BIN_EXE_rillcat"))
            .args(&self.args)
            .env("RUST_LOG", "info")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        // Dropping the handle closes stdin so the child sees end of input.
        if let Some(mut pipe) = child.stdin.take() {
            if let Some(data) = &self.stdin {
                pipe.write_all(data)?;
            }
        }

        let output = child.wait_with_output()?;
        Ok(RunOutput {
            success: output.status.success(),
            stdout: output.stdout,
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
