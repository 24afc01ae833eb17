//! Calls to the stocks server.
//!
//! Two seams are defined here so the dashboard can run against in-memory fakes:
//! [`QuoteSource`] for quote queries and [`SavedStocksApi`] for the saved watchlist of a
//! signed-in user. [`ServerClient`] implements both over the JSON-lines TCP protocol,
//! opening one short-lived connection per call.
use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{debug, warn};
use stocks_common::protocol::{read_message, write_message};
use stocks_common::{QuoteFailure, Request, Response, StockQuote, StocksError, Ticker};

/// Quote query for one ticker.
pub trait QuoteSource: Send + Sync {
    /// Fetches the normalized quote, or the classified reason there is none.
    fn get_stock_data(&self, ticker: &Ticker) -> Result<StockQuote, QuoteFailure>;
}

/// Saved watchlist of a signed-in user.
pub trait SavedStocksApi: Send + Sync {
    /// Reads the saved tickers of `user`.
    fn get_saved_stocks(&self, user: &str) -> Result<Vec<Ticker>, StocksError>;

    /// Replaces the saved tickers of `user`.
    fn update_saved_stocks(&self, user: &str, stocks: &[Ticker]) -> Result<(), StocksError>;
}

/// TCP client of the stocks server.
pub struct ServerClient {
    addr: String,
    timeout: Duration,
}

impl ServerClient {
    /// Client for the server at `addr` (e.g., `127.0.0.1:8080`).
    pub fn new(addr: &str, timeout: Duration) -> Self {
        Self {
            addr: addr.to_string(),
            timeout,
        }
    }

    fn call(&self, request: &Request) -> Result<Response, StocksError> {
        let target = self
            .addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                StocksError::Format(format!("Cannot resolve server address {}", self.addr))
            })?;

        let stream = TcpStream::connect_timeout(&target, self.timeout)?;
        stream.set_read_timeout(Some(self.timeout))?;
        stream.set_write_timeout(Some(self.timeout))?;

        debug!("Sending {:?} to {}", request, target);
        let mut reader = BufReader::new(stream.try_clone()?);
        let mut writer = stream;
        write_message(&mut writer, request)?;

        read_message(&mut reader)?.ok_or_else(|| {
            StocksError::UnexpectedResponse("connection closed before response".to_string())
        })
    }
}

impl QuoteSource for ServerClient {
    fn get_stock_data(&self, ticker: &Ticker) -> Result<StockQuote, QuoteFailure> {
        let request = Request::GetStockData { ticker: ticker.clone() };
        match self.call(&request) {
            Ok(Response::StockData(quote)) => Ok(quote),
            Ok(Response::QuoteFailed(failure)) => Err(failure),
            Ok(other) => {
                warn!("Unexpected quote response for {}: {:?}", ticker, other);
                Err(QuoteFailure::Upstream)
            }
            Err(e) => {
                warn!("Quote request for {} failed: {}", ticker, e);
                Err(QuoteFailure::Upstream)
            }
        }
    }
}

impl SavedStocksApi for ServerClient {
    fn get_saved_stocks(&self, user: &str) -> Result<Vec<Ticker>, StocksError> {
        let request = Request::GetSavedStocks { user: user.to_string() };
        match self.call(&request)? {
            Response::SavedStocks(stocks) => Ok(stocks),
            Response::Error(message) => Err(StocksError::Remote(message)),
            other => Err(StocksError::UnexpectedResponse(format!("{:?}", other))),
        }
    }

    fn update_saved_stocks(&self, user: &str, stocks: &[Ticker]) -> Result<(), StocksError> {
        let request = Request::UpdateSavedStocks {
            user: user.to_string(),
            stocks: stocks.to_vec(),
        };
        match self.call(&request)? {
            Response::Updated => Ok(()),
            Response::Error(message) => Err(StocksError::Remote(message)),
            other => Err(StocksError::UnexpectedResponse(format!("{:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Accepts one connection and answers its single request with `response`.
    fn one_shot_server(response: Response) -> (String, thread::JoinHandle<Option<Request>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut writer = stream;
            let request: Option<Request> = read_message(&mut reader).unwrap();
            write_message(&mut writer, &response).unwrap();
            request
        });
        (addr, handle)
    }

    fn client(addr: &str) -> ServerClient {
        ServerClient::new(addr, Duration::from_secs(2))
    }

    #[test]
    fn quote_failure_is_passed_through() {
        let (addr, server) = one_shot_server(Response::QuoteFailed(QuoteFailure::NotFound));
        let result = client(&addr).get_stock_data(&Ticker::parse("zzzz").unwrap());

        assert_eq!(result, Err(QuoteFailure::NotFound));
        assert_eq!(
            server.join().unwrap(),
            Some(Request::GetStockData {
                ticker: Ticker::parse("ZZZZ").unwrap()
            })
        );
    }

    #[test]
    fn server_error_on_quote_is_upstream() {
        let (addr, server) = one_shot_server(Response::Error("boom".to_string()));
        let result = client(&addr).get_stock_data(&Ticker::parse("AAPL").unwrap());
        assert_eq!(result, Err(QuoteFailure::Upstream));
        server.join().unwrap();
    }

    #[test]
    fn unreachable_server_is_upstream() {
        // Bind and drop to get a port nobody listens on.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().to_string();
        let result = client(&addr).get_stock_data(&Ticker::parse("AAPL").unwrap());
        assert_eq!(result, Err(QuoteFailure::Upstream));
    }

    #[test]
    fn saved_stocks_error_is_remote() {
        let (addr, server) = one_shot_server(Response::Error("db down".to_string()));
        let result = client(&addr).update_saved_stocks("alice", &[Ticker::parse("AAPL").unwrap()]);
        assert!(matches!(result, Err(StocksError::Remote(message)) if message == "db down"));
        server.join().unwrap();
    }
}
