//! Command-line arguments for the dashboard.
//!
//! This module defines the CLI interface using `clap`. See `main` for end-to-end usage.
use std::path::PathBuf;

use clap::Parser;
use stocks_common::net::DEFAULT_TIMEOUT_MS;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address of the stocks server. Defaults to the service port on localhost.
    #[clap(long)]
    pub server: Option<String>,

    /// File used as local storage for the guest-mode watchlist.
    #[clap(long, default_value = "./stocks_storage.json")]
    pub storage: PathBuf,

    /// Resolve the session as signed in for this user. Guest mode when omitted.
    #[clap(long)]
    pub user: Option<String>,

    /// Time between two quote polls of the same ticker, in milliseconds.
    #[clap(long, default_value_t = 600_000)]
    pub poll_interval_ms: u64,

    /// Timeout for each server request, in milliseconds.
    #[clap(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,
}
