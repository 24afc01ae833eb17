//! Per-ticker quote display state.
use chrono::{DateTime, Local};
use stocks_common::StockQuote;

/// What a ticker's card currently shows.
#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    /// No poll has completed since the ticker started being tracked.
    Loading,
    /// Latest successful quote.
    Ready {
        /// Normalized quote.
        quote: StockQuote,
        /// When the poll completed.
        fetched_at: DateTime<Local>,
    },
    /// The last poll failed upstream; retried on the next interval.
    Degraded {
        /// Last good quote, shown as stale if present.
        last: Option<StockQuote>,
        /// When the failing poll completed.
        failed_at: DateTime<Local>,
    },
}

impl CardState {
    /// Most recent quote known for the card, stale or not.
    pub fn quote(&self) -> Option<&StockQuote> {
        match self {
            CardState::Loading => None,
            CardState::Ready { quote, .. } => Some(quote),
            CardState::Degraded { last, .. } => last.as_ref(),
        }
    }

    /// Moves to the degraded state, keeping the last good quote.
    pub fn degrade(&self, failed_at: DateTime<Local>) -> CardState {
        CardState::Degraded {
            last: self.quote().cloned(),
            failed_at,
        }
    }
}
