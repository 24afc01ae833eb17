//! Domain models of the stocks server.
//!
//! - `market` — the `QuoteProvider` seam and the simulated market behind it.
//! - `saved_stocks` — per-user saved watchlists, optionally mirrored to a JSON file.

pub mod market;
pub mod saved_stocks;
