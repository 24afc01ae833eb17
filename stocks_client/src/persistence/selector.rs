//! Chooses the authoritative watchlist backend from the session status.
//!
//! | status            | backend          | reads / writes                |
//! |-------------------|------------------|-------------------------------|
//! | `Unresolved`      | none             | nothing                       |
//! | `Unauthenticated` | [`LocalBackend`] | local storage, synchronous    |
//! | `Authenticated`   | [`RemoteBackend`]| saved stocks, background      |
//!
//! Moving to a new resolved status hydrates exactly once. Reporting the status the
//! selector is already in does nothing, so a provider refresh never reloads and
//! overwrites edits made since hydration. The saved watchlist arrives later as a
//! [`Hydrated`] event; every status change starts a new session number, and an event
//! carrying an older number is ignored.
use std::sync::Arc;

use crossbeam_channel::Sender;
use log::{debug, error, info, warn};
use stocks_common::StocksError;

use crate::api::SavedStocksApi;
use crate::model::auth::AuthStatus;
use crate::model::feedback::FeedbackChannel;
use crate::model::watchlist::Watchlist;
use crate::persistence::{Hydrated, WatchlistBackend};
use crate::persistence::local::{LocalBackend, LocalStorage};
use crate::persistence::remote::{RemoteBackend, RetryPolicy};

/// Backend per session status.
pub enum Backend {
    /// No session resolved yet.
    Unresolved,
    /// Guest mode.
    Local(LocalBackend),
    /// Signed-in mode.
    Remote(RemoteBackend),
}

impl Backend {
    fn as_dyn(&mut self) -> Option<&mut dyn WatchlistBackend> {
        match self {
            Backend::Unresolved => None,
            Backend::Local(local) => Some(local as &mut dyn WatchlistBackend),
            Backend::Remote(remote) => Some(remote as &mut dyn WatchlistBackend),
        }
    }

    fn release(&mut self) {
        if let Backend::Remote(remote) = self {
            remote.release();
        }
    }

    fn shutdown(&mut self) {
        if let Backend::Remote(remote) = self {
            remote.shutdown();
        }
    }
}

/// What a status report did to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionChange {
    /// Same status as before; nothing happened.
    Unchanged,
    /// The session became unresolved; nothing is loaded.
    Unresolved,
    /// The local watchlist was loaded.
    Loaded(Watchlist),
    /// The saved watchlist is loading; a [`Hydrated`] event follows.
    Loading,
}

/// Why a flush request did not write anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushSkip {
    /// No session resolved yet.
    Unresolved,
    /// Nothing happened since hydration.
    Pending,
    /// The saved watchlist has not arrived yet.
    Hydrating,
    /// Remote hydration failed; writes are held back for this session.
    NotHydrated,
}

/// Session-status state machine over the two backends.
pub struct PersistenceSelector {
    status: AuthStatus,
    backend: Backend,
    storage: LocalStorage,
    api: Arc<dyn SavedStocksApi>,
    retry: RetryPolicy,
    hydrated: Sender<Hydrated>,
    session: u64,
    loading: bool,
    writable: bool,
}

impl PersistenceSelector {
    /// Selector in the `Unresolved` state. Background loads report to `hydrated`.
    pub fn new(
        storage: LocalStorage,
        api: Arc<dyn SavedStocksApi>,
        retry: RetryPolicy,
        hydrated: Sender<Hydrated>,
    ) -> Self {
        Self {
            status: AuthStatus::Unresolved,
            backend: Backend::Unresolved,
            storage,
            api,
            retry,
            hydrated,
            session: 0,
            loading: false,
            writable: false,
        }
    }

    /// Current status.
    pub fn status(&self) -> &AuthStatus {
        &self.status
    }

    /// Applies a status report from the authentication provider.
    ///
    /// Guest sessions load synchronously from local storage; a failed local load yields
    /// an empty watchlist with writes still enabled. Signed-in sessions start a
    /// background load and return [`SessionChange::Loading`]. The previous remote writer
    /// is released, not joined, so its pending writes never hold up the caller.
    pub fn on_auth_status(&mut self, status: AuthStatus) -> SessionChange {
        if status == self.status {
            debug!("Session unchanged ({}), not hydrating", status);
            return SessionChange::Unchanged;
        }

        info!("Session changed: {} -> {}", self.status, status);
        self.backend.release();
        self.status = status.clone();
        self.session += 1;
        self.loading = false;
        self.writable = false;

        self.backend = match &status {
            AuthStatus::Unresolved => Backend::Unresolved,
            AuthStatus::Unauthenticated => Backend::Local(LocalBackend::new(self.storage.clone())),
            AuthStatus::Authenticated { user } => {
                match RemoteBackend::new(user, Arc::clone(&self.api), self.retry) {
                    Ok(remote) => Backend::Remote(remote),
                    Err(e) => {
                        error!("Cannot start saved stocks writer for {}: {}", user, e);
                        Backend::Unresolved
                    }
                }
            }
        };

        match &mut self.backend {
            Backend::Unresolved if status.is_resolved() => {
                SessionChange::Loaded(Watchlist::default())
            }
            Backend::Unresolved => SessionChange::Unresolved,
            Backend::Local(local) => {
                self.writable = true;
                match local.hydrate() {
                    Ok(watchlist) => {
                        info!("Hydrated {} tickers from {}", watchlist.len(), local.name());
                        SessionChange::Loaded(watchlist)
                    }
                    Err(e) => {
                        error!("Failed to load watchlist from {}: {}", local.name(), e);
                        SessionChange::Loaded(Watchlist::default())
                    }
                }
            }
            Backend::Remote(remote) => {
                match remote.hydrate_in_background(self.session, self.hydrated.clone()) {
                    Ok(()) => {
                        self.loading = true;
                        SessionChange::Loading
                    }
                    Err(e) => {
                        error!("Cannot start loading saved stocks of {}: {}", remote.user(), e);
                        SessionChange::Loaded(Watchlist::default())
                    }
                }
            }
        }
    }

    /// Applies a background load result.
    ///
    /// Returns the watchlist to show, or `None` if the result belongs to an earlier
    /// session. A failed load yields an empty watchlist and keeps writes disabled for
    /// the session, so the empty value never replaces saved data.
    pub fn on_hydrated(&mut self, event: Hydrated) -> Option<Watchlist> {
        if event.session != self.session || !self.loading {
            debug!("Ignoring saved watchlist from session {}", event.session);
            return None;
        }
        self.loading = false;
        match event.watchlist {
            Some(watchlist) => {
                info!("Hydrated {} tickers from saved stocks", watchlist.len());
                self.writable = true;
                Some(watchlist)
            }
            None => Some(Watchlist::default()),
        }
    }

    /// Saves `watchlist` to the authoritative backend.
    ///
    /// Skipped while no session is resolved, while the saved watchlist is loading and
    /// while `feedback` is still pending (unset or the getting-started message). Local
    /// write failures are logged and dropped; remote writes are queued and retried in
    /// the background.
    pub fn flush(
        &mut self,
        watchlist: &Watchlist,
        feedback: &FeedbackChannel,
    ) -> Result<(), FlushSkip> {
        if feedback.is_pending() {
            return Err(FlushSkip::Pending);
        }
        if self.loading {
            return Err(FlushSkip::Hydrating);
        }
        if self.status.is_resolved() && !self.writable {
            return Err(FlushSkip::NotHydrated);
        }
        let Some(backend) = self.backend.as_dyn() else {
            return Err(FlushSkip::Unresolved);
        };

        if let Err(e) = backend.flush(watchlist) {
            log_flush_failure(backend.name(), &e);
        }
        Ok(())
    }

    /// Waits for queued remote writes and stops the backend.
    pub fn shutdown(&mut self) {
        self.backend.shutdown();
    }
}

fn log_flush_failure(backend: &str, e: &StocksError) {
    match e {
        StocksError::ChannelSend(_) => warn!("Watchlist update for {} not queued: {}", backend, e),
        _ => error!("Failed to write watchlist to {}: {}", backend, e),
    }
}
