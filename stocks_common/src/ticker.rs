//! Normalized ticker symbols shared between client and server.
//!
//! A `Ticker` is always trimmed, uppercased, non-empty and free of inner whitespace.
//! Normalization happens once, where a user-supplied string enters the system
//! (`Ticker::parse`, `FromStr` and deserialization), so equality afterwards is a plain
//! case-sensitive comparison.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StocksError;

/// Stock symbol used as the unique key of a watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Normalizes raw user input into a ticker.
    ///
    /// Surrounding whitespace is trimmed and the symbol is uppercased. Empty input and
    /// input with several words are rejected with [`StocksError::InvalidTicker`].
    pub fn parse(raw: &str) -> Result<Self, StocksError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.contains(char::is_whitespace) {
            return Err(StocksError::InvalidTicker(raw.to_string()));
        }
        Ok(Ticker(trimmed.to_uppercase()))
    }

    /// The normalized symbol.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Ticker {
    type Err = StocksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ticker::parse(s)
    }
}

impl TryFrom<String> for Ticker {
    type Error = StocksError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(ticker: Ticker) -> Self {
        ticker.0
    }
}

impl AsRef<str> for Ticker {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}
