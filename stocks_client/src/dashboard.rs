//! The dashboard reducer.
//!
//! Every input arrives as a [`DashboardEvent`] and is applied on one thread by
//! [`Dashboard::apply`]. User intents are applied synchronously, so a removal is visible
//! before any poll that was already in flight completes. After each watchlist change the
//! reducer flushes once to the selected backend and brings the pollers and cards in
//! step with the new snapshot. Signing in clears the board until the saved watchlist
//! arrives as [`DashboardEvent::Hydrated`].
use std::collections::HashMap;

use log::{debug, info, warn};
use stocks_common::{QuoteFailure, Ticker};

use crate::model::auth::AuthStatus;
use crate::model::card::CardState;
use crate::model::feedback::Feedback;
use crate::model::watchlist::{AddOutcome, Removal, WatchlistStore};
use crate::persistence::Hydrated;
use crate::persistence::selector::{PersistenceSelector, SessionChange};
use crate::poller::{PollEvent, QuotePollers};

/// Input to the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// User asked to track a raw symbol.
    Add(String),
    /// User asked to stop tracking a raw symbol.
    Remove(String),
    /// Authentication provider reported a status.
    Auth(AuthStatus),
    /// A poll completed.
    Poll(PollEvent),
    /// A background load of the saved watchlist completed.
    Hydrated(Hydrated),
}

/// Watchlist, persistence, pollers and per-ticker cards.
pub struct Dashboard {
    store: WatchlistStore,
    selector: PersistenceSelector,
    pollers: QuotePollers,
    cards: HashMap<Ticker, CardState>,
}

impl Dashboard {
    /// Dashboard with an empty watchlist and an unresolved session.
    pub fn new(selector: PersistenceSelector, pollers: QuotePollers) -> Self {
        Self {
            store: WatchlistStore::default(),
            selector,
            pollers,
            cards: HashMap::new(),
        }
    }

    /// Applies one event. Returns `true` if anything visible changed.
    pub fn apply(&mut self, event: DashboardEvent) -> bool {
        match event {
            DashboardEvent::Add(input) => self.add(&input) != AddOutcome::Invalid,
            DashboardEvent::Remove(input) => self.remove(&input),
            DashboardEvent::Auth(status) => self.on_auth_status(status),
            DashboardEvent::Poll(poll) => self.on_poll(poll),
            DashboardEvent::Hydrated(event) => self.on_hydrated(event),
        }
    }

    /// Tracks a user-supplied symbol.
    pub fn add(&mut self, input: &str) -> AddOutcome {
        let outcome = self.store.add(input);
        if outcome.added() {
            self.after_mutation();
        }
        outcome
    }

    /// Stops tracking a user-supplied symbol. Unknown or blank input is a no-op.
    pub fn remove(&mut self, input: &str) -> bool {
        let Ok(ticker) = Ticker::parse(input) else {
            return false;
        };
        let removed = self.store.remove(&ticker, Removal::User);
        if removed {
            self.after_mutation();
        }
        removed
    }

    fn on_auth_status(&mut self, status: AuthStatus) -> bool {
        match self.selector.on_auth_status(status) {
            SessionChange::Unchanged | SessionChange::Unresolved => return false,
            SessionChange::Loaded(loaded) => self.store.hydrate(loaded),
            SessionChange::Loading => self.store.clear(),
        }
        self.sync_with_watchlist();
        true
    }

    fn on_hydrated(&mut self, event: Hydrated) -> bool {
        let Some(loaded) = self.selector.on_hydrated(event) else {
            return false;
        };
        self.store.hydrate(loaded);
        self.sync_with_watchlist();
        true
    }

    fn on_poll(&mut self, event: PollEvent) -> bool {
        if !self.store.contains(&event.ticker) || !self.pollers.is_current(&event) {
            debug!("Ignoring poll result for untracked {}", event.ticker);
            return false;
        }

        match event.outcome {
            Ok(quote) => {
                self.cards.insert(
                    event.ticker,
                    CardState::Ready {
                        quote,
                        fetched_at: event.completed_at,
                    },
                );
            }
            Err(QuoteFailure::NotFound) => {
                info!("{} not found upstream, removing it", event.ticker);
                if self.store.remove(&event.ticker, Removal::NotFound) {
                    self.after_mutation();
                }
            }
            Err(QuoteFailure::Upstream) => {
                warn!("Quote for {} unavailable, retrying next interval", event.ticker);
                let degraded = match self.cards.get(&event.ticker) {
                    Some(card) => card.degrade(event.completed_at),
                    None => CardState::Loading.degrade(event.completed_at),
                };
                self.cards.insert(event.ticker, degraded);
            }
        }
        true
    }

    fn after_mutation(&mut self) {
        let snapshot = self.store.snapshot();
        if let Err(skip) = self.selector.flush(&snapshot, self.store.feedback()) {
            debug!("Flush skipped: {:?}", skip);
        }
        self.sync_with_watchlist();
    }

    fn sync_with_watchlist(&mut self) {
        let snapshot = self.store.snapshot();
        self.pollers.sync(&snapshot);
        self.cards.retain(|ticker, _| snapshot.contains(ticker));
        for ticker in snapshot.iter() {
            self.cards.entry(ticker.clone()).or_insert(CardState::Loading);
        }
    }

    /// Tracked tickers in display order.
    pub fn values(&self) -> Vec<Ticker> {
        self.store.values()
    }

    /// Current feedback message.
    pub fn feedback(&self) -> Option<&Feedback> {
        self.store.feedback().current()
    }

    /// Card of a tracked ticker.
    pub fn card(&self, ticker: &Ticker) -> Option<&CardState> {
        self.cards.get(ticker)
    }

    /// Session status the persistence follows.
    pub fn status(&self) -> &AuthStatus {
        self.selector.status()
    }

    /// Stops pollers and waits for queued remote writes.
    pub fn shutdown(&mut self) {
        self.pollers.stop_all();
        self.selector.shutdown();
    }
}
