//! Portal CLI - Main entry point.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use portal_cli::{Cli, LogLevel, dispatch_command};

/// Build the log filter: `RUST_LOG`, then `PORTAL_LOG_LEVEL`, then `--log-level`.
fn log_filter(cli_level: LogLevel) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = std::env::var("PORTAL_LOG_LEVEL")
        .ok()
        .and_then(|v| LogLevel::from_str_loose(&v))
        .unwrap_or(cli_level);
    EnvFilter::new(level.as_filter_str())
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.log_level))
        .with_writer(std::io::stderr)
        .init();

    dispatch_command(cli).await
}
