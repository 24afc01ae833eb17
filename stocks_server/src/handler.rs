use std::sync::Arc;

use log::{debug, error, warn};
use stocks_common::quote::normalize;
use stocks_common::{QuoteFailure, Request, Response};

use crate::model::market::QuoteProvider;
use crate::model::saved_stocks::SavedStocksStore;

/// Maps one decoded `Request` to its `Response`.
///
/// Quote lookups are classified here: no provider record is `NotFound`, while a provider
/// fault or an incomplete record is `Upstream`. Store faults become `Response::Error`.
pub struct RequestHandler {
    provider: Arc<dyn QuoteProvider>,
    store: Arc<SavedStocksStore>,
}

impl RequestHandler {
    /// Create a handler over a quote provider and a saved-watchlist store.
    pub fn new(provider: Arc<dyn QuoteProvider>, store: Arc<SavedStocksStore>) -> Self {
        Self { provider, store }
    }

    /// Process a single request.
    pub fn handle(&self, request: Request) -> Response {
        match request {
            Request::GetStockData { ticker } => {
                let raw = match self.provider.lookup(&ticker) {
                    Ok(raw) => raw,
                    Err(e) => {
                        warn!("Quote provider failed for {}: {}", ticker, e);
                        return Response::QuoteFailed(QuoteFailure::Upstream);
                    }
                };
                match normalize(raw.as_ref()) {
                    Ok(quote) => {
                        debug!("{}: {}{:.2}", ticker, quote.currency_symbol, quote.current_price);
                        Response::StockData(quote)
                    }
                    Err(failure) => {
                        debug!("{}: {}", ticker, failure);
                        Response::QuoteFailed(failure)
                    }
                }
            }
            Request::GetSavedStocks { user } => match self.store.get(&user) {
                Ok(stocks) => Response::SavedStocks(stocks),
                Err(e) => {
                    error!("Failed to read saved stocks of {}: {}", user, e);
                    Response::Error(e.to_string())
                }
            },
            Request::UpdateSavedStocks { user, stocks } => match self.store.update(&user, stocks) {
                Ok(()) => Response::Updated,
                Err(e) => {
                    error!("Failed to update saved stocks of {}: {}", user, e);
                    Response::Error(e.to_string())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stocks_common::{RawQuote, StocksError, Ticker};

    struct FixedProvider;

    impl QuoteProvider for FixedProvider {
        fn lookup(&self, ticker: &Ticker) -> Result<Option<RawQuote>, StocksError> {
            match ticker.as_str() {
                "AAPL" => Ok(Some(RawQuote {
                    symbol: "AAPL".to_string(),
                    currency: Some("USD".to_string()),
                    regular_market_day_high: Some(190.0),
                    regular_market_change_percent: Some(1.5),
                    regular_market_price: Some(189.5),
                })),
                "HALF" => Ok(Some(RawQuote {
                    symbol: "HALF".to_string(),
                    ..RawQuote::default()
                })),
                "BOOM" => Err(StocksError::Format("provider down".to_string())),
                _ => Ok(None),
            }
        }
    }

    fn handler() -> RequestHandler {
        RequestHandler::new(Arc::new(FixedProvider), Arc::new(SavedStocksStore::in_memory()))
    }

    fn quote_request(symbol: &str) -> Request {
        Request::GetStockData {
            ticker: Ticker::parse(symbol).unwrap(),
        }
    }

    #[test]
    fn classifies_quote_lookups() {
        let handler = handler();

        match handler.handle(quote_request("aapl")) {
            Response::StockData(quote) => {
                assert_eq!(quote.currency_symbol, "$");
                assert_eq!(quote.current_price, 189.5);
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert_eq!(
            handler.handle(quote_request("ZZZZ")),
            Response::QuoteFailed(QuoteFailure::NotFound)
        );
        assert_eq!(
            handler.handle(quote_request("HALF")),
            Response::QuoteFailed(QuoteFailure::Upstream)
        );
        assert_eq!(
            handler.handle(quote_request("BOOM")),
            Response::QuoteFailed(QuoteFailure::Upstream)
        );
    }

    #[test]
    fn saves_and_reads_user_watchlist() {
        let handler = handler();
        let stocks = vec![Ticker::parse("MSFT").unwrap()];

        assert_eq!(
            handler.handle(Request::UpdateSavedStocks {
                user: "alice".to_string(),
                stocks: stocks.clone(),
            }),
            Response::Updated
        );
        assert_eq!(
            handler.handle(Request::GetSavedStocks {
                user: "alice".to_string()
            }),
            Response::SavedStocks(stocks)
        );
    }
}
