//! rillcat - stream files, stdin, HTTP bodies and literal text through rill.
//!
//! Data goes to stdout; logs go to stderr.

mod cli;
mod commands;
mod config;
mod origin;

use crate::cli::Cli;
use crate::config::Config;
use crate::origin::Origin;
use clap::Parser;
use std::io;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration before logging so the configured level applies
    let config = Config::resolve(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let origin = Origin::parse(cli.command.origin());
    info!(command = ?cli.command, origin = ?origin, "Starting rillcat");

    let mut source = origin.open(&config.http).map_err(|e| {
        error!(code = e.error_code(), error = %e, "Failed to open origin");
        e
    })?;

    let stdout = io::stdout();
    commands::run(&cli.command, &mut source, &config.stream, stdout.lock()).map_err(|e| {
        error!(error = %e, "Command failed");
        e
    })
}
