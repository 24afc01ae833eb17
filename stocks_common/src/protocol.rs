//! Request/response messages exchanged between the dashboard and the stocks server.
//!
//! Messages are JSON objects framed one per line over a TCP stream. A connection may
//! carry any number of request/response pairs; the server answers each request with
//! exactly one response, in order.
use std::io::{BufRead, Write};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::StocksError;
use crate::quote::{QuoteFailure, StockQuote};
use crate::ticker::Ticker;

/// Client to server message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    /// Quote query for one ticker.
    GetStockData {
        /// Ticker to look up.
        ticker: Ticker,
    },
    /// Read the saved watchlist of a signed-in user.
    GetSavedStocks {
        /// Session user id.
        user: String,
    },
    /// Replace the saved watchlist of a signed-in user.
    UpdateSavedStocks {
        /// Session user id.
        user: String,
        /// Full set of tracked tickers.
        stocks: Vec<Ticker>,
    },
}

/// Server to client message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Response {
    /// Normalized quote for a `GetStockData` request.
    StockData(StockQuote),
    /// Classified failure for a `GetStockData` request.
    QuoteFailed(QuoteFailure),
    /// Saved watchlist for a `GetSavedStocks` request.
    SavedStocks(Vec<Ticker>),
    /// Acknowledges an `UpdateSavedStocks` request.
    Updated,
    /// The request could not be processed.
    Error(String),
}

/// Writes one message as a single JSON line and flushes the writer.
pub fn write_message<W: Write, T: Serialize>(
    writer: &mut W,
    message: &T,
) -> Result<(), StocksError> {
    let mut line = serde_json::to_vec(message)?;
    line.push(b'\n');
    writer.write_all(&line)?;
    writer.flush()?;
    Ok(())
}

/// Reads one JSON line. Returns `Ok(None)` when the peer closed the stream.
pub fn read_message<R: BufRead, T: DeserializeOwned>(
    reader: &mut R,
) -> Result<Option<T>, StocksError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            break;
        }
    }
    Ok(Some(serde_json::from_str(line.trim())?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn request_wire_format() {
        let request = Request::GetStockData {
            ticker: Ticker::parse("aapl").unwrap(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"type":"getStockData","ticker":"AAPL"}"#);
    }

    #[test]
    fn response_wire_format() {
        let json = serde_json::to_string(&Response::QuoteFailed(QuoteFailure::NotFound)).unwrap();
        assert_eq!(json, r#"{"type":"quoteFailed","data":"NotFound"}"#);

        let json = serde_json::to_string(&Response::Updated).unwrap();
        assert_eq!(json, r#"{"type":"updated"}"#);
    }

    #[test]
    fn frames_messages_per_line() {
        let mut buf = Vec::new();
        let saved = Response::SavedStocks(vec![Ticker::parse("msft").unwrap()]);
        write_message(&mut buf, &saved).unwrap();
        write_message(&mut buf, &Response::Updated).unwrap();

        let mut reader = Cursor::new(buf);
        let first: Option<Response> = read_message(&mut reader).unwrap();
        let second: Option<Response> = read_message(&mut reader).unwrap();
        let end: Option<Response> = read_message(&mut reader).unwrap();

        assert_eq!(first, Some(Response::SavedStocks(vec![Ticker::parse("MSFT").unwrap()])));
        assert_eq!(second, Some(Response::Updated));
        assert_eq!(end, None);
    }

    #[test]
    fn malformed_line_is_an_error() {
        let mut reader = Cursor::new(b"{not json}\n".to_vec());
        let result: Result<Option<Request>, _> = read_message(&mut reader);
        assert!(matches!(result, Err(StocksError::SerdeJson(_))));
    }
}
