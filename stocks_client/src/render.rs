//! Plain-text rendering of the dashboard.
//!
//! Numbers are rounded to two decimals here; the quote values themselves are kept
//! unrounded.
use std::fmt::Write;

use stocks_common::{QuoteFailure, StockQuote, Ticker};

use crate::dashboard::Dashboard;
use crate::model::card::CardState;

/// Full dashboard: header, feedback line and one line per card.
pub fn render(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── Stocks Dashboard ({}) ──", dashboard.status());
    if let Some(feedback) = dashboard.feedback() {
        let _ = writeln!(out, "{}", feedback);
    }
    for ticker in dashboard.values() {
        let card = dashboard.card(&ticker).unwrap_or(&CardState::Loading);
        let _ = writeln!(out, "{}", format_card(&ticker, card));
    }
    out
}

/// One card line.
pub fn format_card(ticker: &Ticker, card: &CardState) -> String {
    match card {
        CardState::Loading => format!("{:<8} loading…", ticker),
        CardState::Ready { quote, fetched_at } => format!(
            "{:<8} {}  at {}",
            ticker,
            format_quote(quote),
            fetched_at.format("%H:%M:%S")
        ),
        CardState::Degraded { last, failed_at } => {
            let mut line = format!(
                "{:<8} ⚠ {} since {}",
                ticker,
                QuoteFailure::Upstream,
                failed_at.format("%H:%M:%S")
            );
            if let Some(quote) = last {
                let price = format_price(&quote.currency_symbol, quote.current_price);
                let _ = write!(line, " (last {})", price);
            }
            line
        }
    }
}

fn format_quote(quote: &StockQuote) -> String {
    let arrow = if quote.daily_percent_change < 0.0 { "▼" } else { "▲" };
    format!(
        "{}  high {}  {} {:.2}%",
        format_price(&quote.currency_symbol, quote.current_price),
        format_price(&quote.currency_symbol, quote.daily_high),
        arrow,
        quote.daily_percent_change.abs()
    )
}

fn format_price(symbol: &str, value: f64) -> String {
    format!("{}{:.2}", symbol, value)
}
