//! Quote payloads and the normalizer that turns provider records into display data.
//!
//! A provider answers a lookup with an optional [`RawQuote`]: `None` means it has no
//! record for the symbol. [`normalize`] classifies the outcome before shaping it:
//!
//! - no record — [`QuoteFailure::NotFound`];
//! - a record missing currency, day high, percent change or price —
//!   [`QuoteFailure::Upstream`];
//! - otherwise a [`StockQuote`] with the currency mapped to a display symbol and the
//!   numeric fields passed through unchanged. Rounding is left to the renderer.
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::currency::currency_symbol;

/// Quote record as reported by an upstream market data provider.
///
/// Field names follow the provider's camelCase JSON so listings can be loaded as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuote {
    /// Symbol the record belongs to.
    pub symbol: String,
    /// ISO 4217 currency code of the listing.
    #[serde(default)]
    pub currency: Option<String>,
    /// Highest traded price of the current session.
    #[serde(default)]
    pub regular_market_day_high: Option<f64>,
    /// Change against the previous close, in percent.
    #[serde(default)]
    pub regular_market_change_percent: Option<f64>,
    /// Last traded price.
    #[serde(default)]
    pub regular_market_price: Option<f64>,
}

/// Display-ready quote for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    /// Currency symbol shown before prices; empty when the currency is unmapped.
    pub currency_symbol: String,
    /// Highest traded price of the current session.
    pub daily_high: f64,
    /// Change against the previous close, in percent.
    pub daily_percent_change: f64,
    /// Last traded price.
    pub current_price: f64,
}

/// Classified reason a quote lookup produced no data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum QuoteFailure {
    /// The provider has no record for the symbol.
    #[strum(to_string = "symbol not found")]
    NotFound,
    /// The provider or the service failed, or returned an incomplete record.
    #[strum(to_string = "quote service unavailable")]
    Upstream,
}

impl StockQuote {
    /// Shapes a provider record, failing with `Upstream` when a required field is missing.
    pub fn from_raw(raw: &RawQuote) -> Result<Self, QuoteFailure> {
        let (Some(currency), Some(daily_high), Some(daily_percent_change), Some(current_price)) = (
            raw.currency.as_deref(),
            raw.regular_market_day_high,
            raw.regular_market_change_percent,
            raw.regular_market_price,
        ) else {
            return Err(QuoteFailure::Upstream);
        };

        Ok(StockQuote {
            currency_symbol: currency_symbol(currency).to_string(),
            daily_high,
            daily_percent_change,
            current_price,
        })
    }
}

/// Classifies and normalizes the result of a provider lookup.
pub fn normalize(raw: Option<&RawQuote>) -> Result<StockQuote, QuoteFailure> {
    match raw {
        None => Err(QuoteFailure::NotFound),
        Some(record) => StockQuote::from_raw(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(symbol: &str, currency: &str) -> RawQuote {
        RawQuote {
            symbol: symbol.to_string(),
            currency: Some(currency.to_string()),
            regular_market_day_high: Some(191.05),
            regular_market_change_percent: Some(-0.8312),
            regular_market_price: Some(189.987),
        }
    }

    #[test]
    fn missing_record_is_not_found() {
        assert_eq!(normalize(None), Err(QuoteFailure::NotFound));
    }

    #[test]
    fn incomplete_record_is_upstream() {
        let mut raw = complete("AAPL", "USD");
        raw.regular_market_price = None;
        assert_eq!(normalize(Some(&raw)), Err(QuoteFailure::Upstream));

        let mut raw = complete("AAPL", "USD");
        raw.currency = None;
        assert_eq!(normalize(Some(&raw)), Err(QuoteFailure::Upstream));
    }

    #[test]
    fn passes_numbers_through_unrounded() {
        let quote = normalize(Some(&complete("AAPL", "USD"))).unwrap();
        assert_eq!(quote.currency_symbol, "$");
        assert_eq!(quote.daily_high, 191.05);
        assert_eq!(quote.daily_percent_change, -0.8312);
        assert_eq!(quote.current_price, 189.987);
    }

    #[test]
    fn unknown_currency_gets_empty_symbol() {
        let quote = normalize(Some(&complete("XYZ", "ZZZ"))).unwrap();
        assert_eq!(quote.currency_symbol, "");
    }

    #[test]
    fn raw_quote_reads_provider_json() {
        let raw: RawQuote = serde_json::from_str(
            r#"{"symbol":"SAP.DE","currency":"EUR","regularMarketPrice":120.5}"#,
        )
        .unwrap();
        assert_eq!(raw.currency.as_deref(), Some("EUR"));
        assert_eq!(raw.regular_market_day_high, None);
        assert_eq!(normalize(Some(&raw)), Err(QuoteFailure::Upstream));
    }
}
