//! gitledger: commit reports and author statistics across a workspace
//!
//! This binary scans a workspace for git repositories and prints repository
//! listings, author statistics or one author's commit report.

use anyhow::Result;
use clap::Parser;
use gitledger::commands;
use gitledger::config::Config;
use tracing::debug;

fn main() -> Result<()> {
    let config = Config::parse();

    // Logs go to stderr so that stdout carries only command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    config.validate()?;
    debug!(?config, "Starting gitledger");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::execute(config, &mut out)
}
