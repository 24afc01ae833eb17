//! Watchlist persistence.
//!
//! Each backend offers the same `{hydrate, flush}` pair through [`WatchlistBackend`]:
//!
//! - `local` — guest mode; a JSON array under one key of a client-side key-value file.
//! - `remote` — signed-in mode; the server-side saved watchlist, written by a background
//!   worker that coalesces rapid flushes and retries failed writes.
//! - `selector` — picks the backend from the session status and decides when to
//!   hydrate and when a flush is allowed.
pub mod local;
pub mod remote;
pub mod selector;

use stocks_common::StocksError;

use crate::model::watchlist::Watchlist;

/// Result of a background load of the saved watchlist.
///
/// `session` identifies the session the load was started for; a result for any other
/// session is stale. `watchlist` is `None` when every attempt failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated {
    /// Session counter at the time the load started.
    pub session: u64,
    /// Loaded watchlist, or `None` after a failed load.
    pub watchlist: Option<Watchlist>,
}

/// Storage that a watchlist is loaded from and saved to.
pub trait WatchlistBackend {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Loads the stored watchlist.
    fn hydrate(&mut self) -> Result<Watchlist, StocksError>;

    /// Saves `watchlist`. Remote backends may complete the write asynchronously.
    fn flush(&mut self, watchlist: &Watchlist) -> Result<(), StocksError>;
}
