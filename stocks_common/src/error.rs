//! Error types shared between client and server.
//!
//! The `StocksError` enum unifies common failure cases for I/O, serialization,
//! channel communication, remote calls and input validation, allowing crates to
//! propagate a single error type. Per-ticker quote outcomes are not errors; see
//! [`crate::quote::QuoteFailure`].
use std::io;
use std::sync::PoisonError;

use thiserror::Error;

/// Unified error type shared by client and server.
#[derive(Error, Debug)]
pub enum StocksError {
    /// I/O error originating from the standard library, sockets or files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic formatting/validation error with a human-readable message.
    #[error("Format error: {0}")]
    Format(String),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// User-supplied ticker was blank or held several words.
    #[error("Invalid ticker: {0:?}")]
    InvalidTicker(String),

    /// Channel send failed (e.g., receiver dropped); contains a short context string.
    #[error("Channel send failed: {0}")]
    ChannelSend(String),

    /// Error indicating a poisoned mutex/lock was encountered.
    #[error("Mutex Lock Poisoned: {0}")]
    MutexLock(String),

    /// The server processed the request and reported a failure.
    #[error("Remote error: {0}")]
    Remote(String),

    /// The server answered with a message that does not match the request.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl<T> From<PoisonError<T>> for StocksError {
    fn from(err: PoisonError<T>) -> Self {
        StocksError::MutexLock(err.to_string())
    }
}
