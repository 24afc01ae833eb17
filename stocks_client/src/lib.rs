//! Stocks Dashboard client library.
//!
//! Keeps a deduplicated watchlist of tickers, persists it to local storage in guest mode
//! or to the server's saved watchlist when signed in, polls a quote per ticker and
//! drops tickers the quote provider does not know.
//!
//! - `api` — server calls behind the `QuoteSource` and `SavedStocksApi` seams.
//! - `model` — watchlist, feedback, session status and card state.
//! - `persistence` — local and remote backends and the selector between them.
//! - `poller` — per-ticker polling threads.
//! - `dashboard` — the reducer applying every event on one thread.
//! - `intent` / `render` — prompt parsing and text output.
#![warn(missing_docs)]
pub mod api;
pub mod dashboard;
pub mod intent;
pub mod model;
pub mod persistence;
pub mod poller;
pub mod render;

pub use dashboard::{Dashboard, DashboardEvent};
