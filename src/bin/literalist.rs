//! Literalist CLI - find and refactor magic literals in Python code.
//!
//! Without a command the binary scans a path and prints a unified diff of
//! the proposed changes (or applies them with `--apply`). The `report`,
//! `validate` and `refactor` commands split the same work into pipeline
//! steps that exchange a JSON report.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries diffs and reports.
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    cli::run(cli)
}
