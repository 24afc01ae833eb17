//! Watchlist snapshots and the store holding the current one.
//!
//! A [`Watchlist`] is an immutable value: adding or removing a ticker yields a new
//! snapshot and leaves the old one untouched, so a snapshot handed to a poller or to the
//! flush worker can never change underneath it. [`WatchlistStore`] owns the current
//! snapshot together with the feedback channel, so every successful mutation updates
//! the feedback exactly once.
use std::collections::HashSet;
use std::sync::Arc;

use stocks_common::Ticker;

use crate::model::feedback::{Feedback, FeedbackChannel};

/// Deduplicated set of tracked tickers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watchlist {
    tickers: Arc<HashSet<Ticker>>,
}

impl Watchlist {
    /// `true` if `ticker` is tracked.
    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.tickers.contains(ticker)
    }

    /// Number of tracked tickers.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }

    /// Snapshot with `ticker` added, or `None` if it is already tracked.
    pub fn with(&self, ticker: Ticker) -> Option<Watchlist> {
        if self.contains(&ticker) {
            return None;
        }
        let mut tickers = HashSet::clone(&self.tickers);
        tickers.insert(ticker);
        Some(Watchlist {
            tickers: Arc::new(tickers),
        })
    }

    /// Snapshot with `ticker` removed, or `None` if it was not tracked.
    pub fn without(&self, ticker: &Ticker) -> Option<Watchlist> {
        if !self.contains(ticker) {
            return None;
        }
        let mut tickers = HashSet::clone(&self.tickers);
        tickers.remove(ticker);
        Some(Watchlist {
            tickers: Arc::new(tickers),
        })
    }

    /// Tracked tickers in alphabetical order.
    pub fn values(&self) -> Vec<Ticker> {
        let mut values: Vec<Ticker> = self.tickers.iter().cloned().collect();
        values.sort();
        values
    }

    /// Iterates tickers in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Ticker> {
        self.tickers.iter()
    }
}

impl FromIterator<Ticker> for Watchlist {
    fn from_iter<I: IntoIterator<Item = Ticker>>(iter: I) -> Self {
        Watchlist {
            tickers: Arc::new(iter.into_iter().collect()),
        }
    }
}

/// Result of an add intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// The ticker was inserted.
    Added(Ticker),
    /// The ticker was already tracked; nothing changed.
    Duplicate(Ticker),
    /// Blank input; silently ignored.
    Invalid,
}

impl AddOutcome {
    /// `true` if the watchlist changed.
    pub fn added(&self) -> bool {
        matches!(self, AddOutcome::Added(_))
    }
}

/// Why a ticker is being removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// The user deleted the card.
    User,
    /// The quote provider reported the symbol as unknown.
    NotFound,
}

/// Current watchlist plus the feedback describing the last change to it.
#[derive(Debug, Default)]
pub struct WatchlistStore {
    current: Watchlist,
    feedback: FeedbackChannel,
}

impl WatchlistStore {
    /// Normalizes `input` and tracks it unless it is blank or already tracked.
    pub fn add(&mut self, input: &str) -> AddOutcome {
        let Ok(ticker) = Ticker::parse(input) else {
            return AddOutcome::Invalid;
        };
        match self.current.with(ticker.clone()) {
            Some(next) => {
                self.current = next;
                self.feedback.set(Feedback::Added(ticker.clone()));
                AddOutcome::Added(ticker)
            }
            None => {
                self.feedback.set(Feedback::AlreadyTracked(ticker.clone()));
                AddOutcome::Duplicate(ticker)
            }
        }
    }

    /// Stops tracking `ticker`. Returns `false`, without touching feedback, if it was
    /// not tracked.
    pub fn remove(&mut self, ticker: &Ticker, reason: Removal) -> bool {
        let Some(next) = self.current.without(ticker) else {
            return false;
        };
        self.current = next;
        self.feedback.set(match reason {
            Removal::User => Feedback::Removed(ticker.clone()),
            Removal::NotFound => Feedback::RemovedNotFound(ticker.clone()),
        });
        true
    }

    /// Replaces the watchlist with a freshly loaded one.
    ///
    /// An empty load shows the getting-started message; otherwise feedback is cleared
    /// for the new session.
    pub fn hydrate(&mut self, loaded: Watchlist) {
        if loaded.is_empty() {
            self.feedback.set(Feedback::GettingStarted);
        } else {
            self.feedback.clear();
        }
        self.current = loaded;
    }

    /// Empties the watchlist and feedback while a new session loads.
    pub fn clear(&mut self) {
        self.current = Watchlist::default();
        self.feedback.clear();
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Watchlist {
        self.current.clone()
    }

    /// Tracked tickers in display order.
    pub fn values(&self) -> Vec<Ticker> {
        self.current.values()
    }

    /// `true` if `ticker` is tracked.
    pub fn contains(&self, ticker: &Ticker) -> bool {
        self.current.contains(ticker)
    }

    /// Feedback channel.
    pub fn feedback(&self) -> &FeedbackChannel {
        &self.feedback
    }
}
