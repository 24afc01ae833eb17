//! Command-line arguments for the stocks server.
use std::path::PathBuf;

use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Address to listen on for dashboard connections. Defaults to all interfaces on the
    /// service port.
    #[clap(long)]
    pub bind: Option<String>,

    /// JSON file backing the saved watchlists. Kept in memory only when omitted.
    #[clap(long)]
    pub store: Option<PathBuf>,

    /// JSON array of provider quote records replacing the built-in simulated market.
    #[clap(long)]
    pub listings: Option<PathBuf>,
}
