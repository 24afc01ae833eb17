//! Per-ticker quote polling.
//!
//! Every tracked ticker gets its own poller thread: fetch once right away, then once per
//! interval. Pollers only read; each completed fetch is reported as a [`PollEvent`] on a
//! shared channel and the dashboard decides what it means. A slow or failing ticker
//! never delays the others, and a failed fetch is not retried before the next interval.
//!
//! Removing a ticker drops its stop sender, which ends the poller at its next wait. A
//! fetch already in flight still completes; its event carries the poller generation so
//! the dashboard can ignore results from a poller that is no longer current.
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Local};
use crossbeam_channel::{RecvTimeoutError, Sender, bounded};
use log::{debug, error, info};
use stocks_common::{QuoteFailure, StockQuote, Ticker};

use crate::api::QuoteSource;
use crate::model::watchlist::Watchlist;

/// Default time between two polls of the same ticker.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(600_000);

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PollEvent {
    /// Polled ticker.
    pub ticker: Ticker,
    /// Poller instance that produced the event.
    pub generation: u64,
    /// Normalized quote or classified failure.
    pub outcome: Result<StockQuote, QuoteFailure>,
    /// When the fetch completed.
    pub completed_at: DateTime<Local>,
}

struct PollerHandle {
    generation: u64,
    // Dropping the sender stops the poller.
    _stop: Sender<()>,
}

/// Set of running pollers, kept in step with the watchlist.
pub struct QuotePollers {
    source: Arc<dyn QuoteSource>,
    interval: Duration,
    events: Sender<PollEvent>,
    active: HashMap<Ticker, PollerHandle>,
    next_generation: u64,
}

impl QuotePollers {
    /// Pollers fetching from `source` every `interval`, reporting on `events`.
    pub fn new(
        source: Arc<dyn QuoteSource>,
        interval: Duration,
        events: Sender<PollEvent>,
    ) -> Self {
        Self {
            source,
            interval,
            events,
            active: HashMap::new(),
            next_generation: 0,
        }
    }

    /// Starts pollers for newly tracked tickers and stops those no longer tracked.
    pub fn sync(&mut self, watchlist: &Watchlist) {
        self.active.retain(|ticker, _| {
            let keep = watchlist.contains(ticker);
            if !keep {
                debug!("Stopping poller for {}", ticker);
            }
            keep
        });

        for ticker in watchlist.iter() {
            if !self.active.contains_key(ticker) {
                self.spawn(ticker.clone());
            }
        }
    }

    /// `true` if `event` comes from the current poller of its ticker.
    pub fn is_current(&self, event: &PollEvent) -> bool {
        self.active
            .get(&event.ticker)
            .is_some_and(|handle| handle.generation == event.generation)
    }

    /// Tickers with a running poller.
    pub fn tracked(&self) -> usize {
        self.active.len()
    }

    /// Stops every poller.
    pub fn stop_all(&mut self) {
        if !self.active.is_empty() {
            info!("Stopping {} pollers", self.active.len());
        }
        self.active.clear();
    }

    fn spawn(&mut self, ticker: Ticker) {
        self.next_generation += 1;
        let generation = self.next_generation;
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let interval = self.interval;
        let name = format!("poll-{}", ticker);
        let poll_ticker = ticker.clone();

        let spawned = thread::Builder::new().name(name).spawn(move || {
            loop {
                let outcome = source.get_stock_data(&poll_ticker);
                let event = PollEvent {
                    ticker: poll_ticker.clone(),
                    generation,
                    outcome,
                    completed_at: Local::now(),
                };
                if events.send(event).is_err() {
                    break;
                }
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => continue,
                    _ => break,
                }
            }
            debug!("Poller for {} (#{}) stopped", poll_ticker, generation);
        });

        match spawned {
            Ok(_) => {
                debug!("Started poller for {} (#{})", ticker, generation);
                self.active.insert(
                    ticker,
                    PollerHandle {
                        generation,
                        _stop: stop_tx,
                    },
                );
            }
            Err(e) => error!("Failed to start poller for {}: {}", ticker, e),
        }
    }
}

impl Drop for QuotePollers {
    fn drop(&mut self) {
        self.stop_all();
    }
}
