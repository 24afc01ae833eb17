//! Stocks server.
//!
//! Answers dashboard requests over TCP with newline-delimited JSON. It wires together:
//!
//! - `SimulatedMarket` — a `QuoteProvider` producing raw quote records for a fixed set of
//!   listings, either built in or loaded with `--listings`.
//! - `SavedStocksStore` — per-user saved watchlists, in memory or mirrored to `--store`.
//! - `RequestHandler` — classifies and normalizes quote lookups and serves the saved
//!   watchlist reads and writes.
//! - `RequestReceiver` — accept loop with one thread per dashboard connection.
//!
//! Usage example (CLI):
//! ```bash
//! stocks_server --bind 0.0.0.0:8080 --store ./saved_stocks.json
//! ```
#![warn(missing_docs)]
mod args;
mod handler;
pub mod model;
mod receiver;

use std::sync::Arc;

use clap::Parser;
use log::info;
use stocks_common::Result;
use stocks_common::net::{self, SERVICE_PORT};

use crate::args::Args;
use crate::handler::RequestHandler;
use crate::model::market::{QuoteProvider, SimulatedMarket};
use crate::model::saved_stocks::SavedStocksStore;
use crate::receiver::RequestReceiver;

fn main() -> Result<()> {
    init_logger();
    let args = Args::parse();

    let market = match &args.listings {
        Some(path) => SimulatedMarket::from_file(path)?,
        None => SimulatedMarket::with_default_listings(),
    };
    info!("Market has {} listings", market.listing_count()?);
    let provider: Arc<dyn QuoteProvider> = Arc::new(market);

    let store = match &args.store {
        Some(path) => SavedStocksStore::open(path)?,
        None => SavedStocksStore::in_memory(),
    };

    let handler = Arc::new(RequestHandler::new(provider, Arc::new(store)));
    let bind = args
        .bind
        .clone()
        .unwrap_or_else(|| net::addr("0.0.0.0", SERVICE_PORT));
    let receiver = RequestReceiver::new(&bind)?;
    receiver.serve(handler)
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}
