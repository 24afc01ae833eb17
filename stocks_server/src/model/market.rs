//! Quote providers.
//!
//! `QuoteProvider` is the seam between the request handler and whatever produces raw
//! quote records. A lookup returns `Ok(None)` when the provider has no record for the
//! symbol and `Err` when the provider itself failed; the handler classifies both.
//!
//! `SimulatedMarket` is an in-process provider. Every lookup advances a small random
//! walk around the last price, keeps the session high and recomputes the change against
//! the previous close. Fields a listing was loaded without stay missing, so partial
//! listings exercise the incomplete-record path.
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use log::info;
use rand::Rng;
use stocks_common::{RawQuote, StocksError, Ticker};

/// Source of raw quote records.
pub trait QuoteProvider: Send + Sync {
    /// Looks up the latest record for `ticker`.
    fn lookup(&self, ticker: &Ticker) -> Result<Option<RawQuote>, StocksError>;
}

/// US listings seeded into the default market, all quoted in USD.
const US_LISTINGS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "JPM", "JNJ", "V", "PG", "UNH",
    "HD", "DIS", "PYPL", "NFLX", "ADBE", "CRM", "INTC", "CSCO", "PFE", "ABT", "TMO", "ABBV",
    "LLY", "PEP", "COST", "TXN", "AVGO", "ACN", "QCOM", "ORCL", "AMGN", "SBUX", "INTU", "GS",
    "MS", "BLK", "GE", "MMM", "BKNG", "MCD", "NKE", "UPS", "CAT", "IBM", "AMD", "UBER",
];

/// Listings outside the US with their trading currency.
const FOREIGN_LISTINGS: &[(&str, &str)] = &[
    ("SAP.DE", "EUR"),
    ("ASML.AS", "EUR"),
    ("VOD.L", "GBp"),
    ("7203.T", "JPY"),
    ("SHOP.TO", "CAD"),
    ("0700.HK", "HKD"),
    ("NESN.SW", "CHF"),
];

/// Largest relative price move per lookup.
const MAX_STEP: f64 = 0.01;

/// Floor of the walk: one cent.
const MIN_PRICE: f64 = 0.01;

/// Moves `price` by at most [`MAX_STEP`] either way, rounded to the cent.
fn walk(price: f64, rng: &mut impl Rng) -> f64 {
    let drift = rng.random_range(-MAX_STEP..=MAX_STEP);
    let cents = (price * (1.0 + drift) * 100.0).round();
    (cents / 100.0).max(MIN_PRICE)
}

struct Listing {
    quote: RawQuote,
    previous_close: Option<f64>,
    session: NaiveDate,
}

impl Listing {
    fn new(quote: RawQuote, today: NaiveDate) -> Self {
        Listing {
            previous_close: quote.regular_market_price,
            quote,
            session: today,
        }
    }

    fn tick(&mut self, today: NaiveDate, rng: &mut impl Rng) {
        let Some(current_price) = self.quote.regular_market_price else {
            return;
        };

        if self.session != today {
            self.session = today;
            self.previous_close = Some(current_price);
            if self.quote.regular_market_day_high.is_some() {
                self.quote.regular_market_day_high = Some(current_price);
            }
        }

        let price = walk(current_price, rng);
        self.quote.regular_market_price = Some(price);

        if let Some(high) = self.quote.regular_market_day_high {
            self.quote.regular_market_day_high = Some(high.max(price));
        }
        let change = self.quote.regular_market_change_percent;
        if let (Some(_), Some(close)) = (change, self.previous_close) {
            self.quote.regular_market_change_percent = Some((price - close) / close * 100.0);
        }
    }
}

/// In-process market with a random-walk price per listing.
pub struct SimulatedMarket {
    listings: Mutex<HashMap<Ticker, Listing>>,
}

impl SimulatedMarket {
    /// Builds a market from explicit listings. Records with a blank symbol are rejected.
    pub fn from_listings(quotes: Vec<RawQuote>) -> Result<Self, StocksError> {
        let today = Utc::now().date_naive();
        let mut listings = HashMap::with_capacity(quotes.len());
        for mut quote in quotes {
            let ticker = Ticker::parse(&quote.symbol)?;
            quote.symbol = ticker.to_string();
            listings.insert(ticker, Listing::new(quote, today));
        }
        Ok(Self {
            listings: Mutex::new(listings),
        })
    }

    /// Loads listings from a JSON array of provider records.
    pub fn from_file(path: &Path) -> Result<Self, StocksError> {
        let reader = BufReader::new(File::open(path)?);
        let quotes: Vec<RawQuote> = serde_json::from_reader(reader)?;
        info!("Loaded {} listings from {}", quotes.len(), path.display());
        Self::from_listings(quotes)
    }

    /// Default market: US large caps in USD plus a handful of foreign listings.
    pub fn with_default_listings() -> Self {
        let mut rng = rand::rng();
        let mut seed = |symbol: &str, currency: &str| {
            let price: f64 = rng.random_range(20.0..600.0);
            let price = (price * 100.0).round() / 100.0;
            RawQuote {
                symbol: symbol.to_string(),
                currency: Some(currency.to_string()),
                regular_market_day_high: Some(price),
                regular_market_change_percent: Some(0.0),
                regular_market_price: Some(price),
            }
        };

        let mut quotes: Vec<RawQuote> =
            US_LISTINGS.iter().map(|&symbol| seed(symbol, "USD")).collect();
        quotes.extend(FOREIGN_LISTINGS.iter().map(|&(symbol, currency)| seed(symbol, currency)));

        let today = Utc::now().date_naive();
        let listings = quotes
            .into_iter()
            .filter_map(|quote| {
                let ticker = Ticker::parse(&quote.symbol).ok()?;
                Some((ticker, Listing::new(quote, today)))
            })
            .collect();
        Self {
            listings: Mutex::new(listings),
        }
    }

    /// Number of listed symbols.
    pub fn listing_count(&self) -> Result<usize, StocksError> {
        Ok(self.listings.lock()?.len())
    }
}

impl QuoteProvider for SimulatedMarket {
    fn lookup(&self, ticker: &Ticker) -> Result<Option<RawQuote>, StocksError> {
        let mut listings = self.listings.lock()?;
        let Some(listing) = listings.get_mut(ticker) else {
            return Ok(None);
        };
        listing.tick(Utc::now().date_naive(), &mut rand::rng());
        Ok(Some(listing.quote.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::io::Write;

    fn ticker(symbol: &str) -> Ticker {
        Ticker::parse(symbol).unwrap()
    }

    #[test]
    fn unknown_symbol_has_no_record() {
        let market = SimulatedMarket::with_default_listings();
        assert!(market.lookup(&ticker("ZZZZ")).unwrap().is_none());
    }

    #[test]
    fn default_listings_are_complete() {
        let market = SimulatedMarket::with_default_listings();
        let expected = US_LISTINGS.len() + FOREIGN_LISTINGS.len();
        assert_eq!(market.listing_count().unwrap(), expected);

        let quote = market.lookup(&ticker("aapl")).unwrap().unwrap();
        assert_eq!(quote.currency.as_deref(), Some("USD"));
        assert!(quote.regular_market_price.is_some());
        assert!(quote.regular_market_change_percent.is_some());

        let quote = market.lookup(&ticker("SAP.DE")).unwrap().unwrap();
        assert_eq!(quote.currency.as_deref(), Some("EUR"));
    }

    #[test]
    fn random_walk_stays_within_one_percent_and_tracks_high() {
        let market = SimulatedMarket::from_listings(vec![RawQuote {
            symbol: "msft".to_string(),
            currency: Some("USD".to_string()),
            regular_market_day_high: Some(100.0),
            regular_market_change_percent: Some(0.0),
            regular_market_price: Some(100.0),
        }])
        .unwrap();

        let mut last = 100.0;
        for _ in 0..50 {
            let quote = market.lookup(&ticker("MSFT")).unwrap().unwrap();
            let price = quote.regular_market_price.unwrap();
            assert!((price - last).abs() <= last * MAX_STEP + 0.005 + 1e-9);
            assert!(quote.regular_market_day_high.unwrap() >= price);
            let expected_change = (price - 100.0) / 100.0 * 100.0;
            assert!((quote.regular_market_change_percent.unwrap() - expected_change).abs() < 1e-9);
            last = price;
        }
    }

    #[test]
    fn walk_rounds_to_cents_and_never_drops_below_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut price = 0.02;
        for _ in 0..200 {
            price = walk(price, &mut rng);
            assert!(price >= MIN_PRICE);
            assert!(((price * 100.0).round() - price * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn new_session_resets_close_and_high() {
        let yesterday = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut listing = Listing::new(
            RawQuote {
                symbol: "MSFT".to_string(),
                currency: Some("USD".to_string()),
                regular_market_day_high: Some(120.0),
                regular_market_change_percent: Some(5.0),
                regular_market_price: Some(100.0),
            },
            yesterday,
        );
        listing.previous_close = Some(80.0);

        listing.tick(today, &mut StdRng::seed_from_u64(1));
        let price = listing.quote.regular_market_price.unwrap();
        assert_eq!(listing.previous_close, Some(100.0));
        assert_eq!(listing.session, today);
        assert!(listing.quote.regular_market_day_high.unwrap() <= 101.0);
        let change = listing.quote.regular_market_change_percent.unwrap();
        assert!((change - (price - 100.0)).abs() < 1e-9);
    }

    #[test]
    fn partial_listing_stays_partial() {
        let market = SimulatedMarket::from_listings(vec![RawQuote {
            symbol: "HALF".to_string(),
            currency: Some("USD".to_string()),
            regular_market_day_high: None,
            regular_market_change_percent: None,
            regular_market_price: Some(10.0),
        }])
        .unwrap();

        let quote = market.lookup(&ticker("HALF")).unwrap().unwrap();
        assert!(quote.regular_market_day_high.is_none());
        assert!(quote.regular_market_change_percent.is_none());
    }

    #[test]
    fn loads_listings_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let listing = concat!(
            r#"[{"symbol":"abc","currency":"EUR","regularMarketPrice":5.0,"#,
            r#""regularMarketDayHigh":5.0,"regularMarketChangePercent":0.0}]"#
        );
        file.write_all(listing.as_bytes()).unwrap();

        let market = SimulatedMarket::from_file(file.path()).unwrap();
        let quote = market.lookup(&ticker("ABC")).unwrap().unwrap();
        assert_eq!(quote.symbol, "ABC");
    }
}
