//!
//! Common types and utilities shared by the stocks server and the dashboard client.
//!
//! This crate aggregates:
//! - `error` — unified error type `StocksError` used across the workspace.
//! - `result` — handy `Result<T, StocksError>` alias.
//! - `ticker` — the normalized `Ticker` symbol type.
//! - `currency` — currency code to display symbol lookup.
//! - `quote` — raw upstream payloads, display-ready quotes and the normalizer.
//! - `protocol` — JSON-lines request/response messages exchanged over TCP.
//! - `net` — networking constants and small helpers.
#![warn(missing_docs)]
pub mod currency;
pub mod error;
pub mod net;
pub mod protocol;
pub mod quote;
pub mod result;
pub mod ticker;

pub use error::StocksError;
pub use protocol::{Request, Response};
pub use quote::{QuoteFailure, RawQuote, StockQuote};
pub use result::Result;
pub use ticker::Ticker;
