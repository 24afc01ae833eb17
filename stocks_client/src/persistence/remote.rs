//! Signed-in backend: the saved watchlist on the stocks server.
//!
//! Neither hydration nor flushing runs on the dashboard thread. The saved watchlist is
//! read on a short-lived thread that reports back with a [`Hydrated`] event, and
//! flushes are handed to a [`FlushWorker`] thread. The worker serializes writes and, before each
//! write, drains the queue down to the newest snapshot, so a stale snapshot is never
//! written after a newer one. A write is attempted up to [`MAX_FLUSH_ATTEMPTS`] times and
//! then dropped with a log line.
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, error, info, warn};
use stocks_common::StocksError;

use crate::api::SavedStocksApi;
use crate::model::watchlist::Watchlist;
use crate::persistence::{Hydrated, WatchlistBackend};

/// Attempts per remote read or write before giving up.
pub const MAX_FLUSH_ATTEMPTS: u32 = 3;

/// Bounded retry with linear backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Sleep before attempt `n + 1` is `backoff * n`.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FLUSH_ATTEMPTS,
            backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Runs `op` until it succeeds or the attempts are used up, returning the last error.
    pub fn run<T>(
        &self,
        what: &str,
        mut op: impl FnMut() -> Result<T, StocksError>,
    ) -> Result<T, StocksError> {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    warn!("{} failed (attempt {}/{}): {}", what, attempt, attempts, e);
                    thread::sleep(self.backoff * attempt);
                    attempt += 1;
                }
            }
        }
    }
}

/// Background writer of one user's saved watchlist.
pub struct FlushWorker {
    tx: Option<Sender<Watchlist>>,
    handle: Option<JoinHandle<()>>,
}

impl FlushWorker {
    /// Spawns the worker thread for `user`.
    pub fn start(
        user: &str,
        api: Arc<dyn SavedStocksApi>,
        retry: RetryPolicy,
    ) -> Result<Self, StocksError> {
        let (tx, rx) = unbounded::<Watchlist>();
        let user = user.to_string();
        let handle = thread::Builder::new()
            .name(format!("flush-{}", user))
            .spawn(move || Self::run(&user, api.as_ref(), retry, rx))?;
        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    fn run(user: &str, api: &dyn SavedStocksApi, retry: RetryPolicy, rx: Receiver<Watchlist>) {
        while let Ok(mut latest) = rx.recv() {
            let mut skipped = 0;
            while let Ok(newer) = rx.try_recv() {
                latest = newer;
                skipped += 1;
            }
            if skipped > 0 {
                debug!("Coalesced {} pending watchlist updates for {}", skipped, user);
            }

            let stocks = latest.values();
            let what = format!("Saving watchlist of {}", user);
            match retry.run(&what, || api.update_saved_stocks(user, &stocks)) {
                Ok(()) => info!("Saved {} tickers for {}", stocks.len(), user),
                Err(e) => warn!(
                    "Dropping watchlist update for {} after {} attempts: {}",
                    user, retry.max_attempts, e
                ),
            }
        }
        debug!("Flush worker for {} stopped", user);
    }

    /// Queues a snapshot for writing.
    pub fn submit(&self, watchlist: Watchlist) -> Result<(), StocksError> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| StocksError::ChannelSend("flush worker stopped".to_string()))?;
        tx.send(watchlist)
            .map_err(|e| StocksError::ChannelSend(e.to_string()))
    }

    /// Closes the queue without waiting. The thread finishes the write in progress and
    /// whatever was already queued, then exits on its own.
    pub fn detach(&mut self) {
        self.tx.take();
        self.handle.take();
    }

    /// Closes the queue and waits for pending writes to finish.
    pub fn shutdown(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Flush worker panicked");
            }
        }
    }
}

/// Signed-in backend for one user.
pub struct RemoteBackend {
    user: String,
    api: Arc<dyn SavedStocksApi>,
    retry: RetryPolicy,
    worker: FlushWorker,
}

impl RemoteBackend {
    /// Backend for `user`, starting its flush worker.
    pub fn new(
        user: &str,
        api: Arc<dyn SavedStocksApi>,
        retry: RetryPolicy,
    ) -> Result<Self, StocksError> {
        let worker = FlushWorker::start(user, Arc::clone(&api), retry)?;
        Ok(Self {
            user: user.to_string(),
            api,
            retry,
            worker,
        })
    }

    /// Session user.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Loads the saved watchlist on a background thread and sends the result, tagged
    /// with `session`, to `done`.
    pub fn hydrate_in_background(
        &self,
        session: u64,
        done: Sender<Hydrated>,
    ) -> Result<(), StocksError> {
        let user = self.user.clone();
        let api = Arc::clone(&self.api);
        let retry = self.retry;
        thread::Builder::new()
            .name(format!("hydrate-{}", user))
            .spawn(move || {
                let watchlist = match load_saved(&user, api.as_ref(), retry) {
                    Ok(watchlist) => Some(watchlist),
                    Err(e) => {
                        error!("Failed to load saved watchlist of {}: {}", user, e);
                        None
                    }
                };
                if done.send(Hydrated { session, watchlist }).is_err() {
                    debug!("Dashboard gone, dropping saved watchlist of {}", user);
                }
            })?;
        Ok(())
    }

    /// Stops accepting writes and lets the worker finish in the background.
    pub fn release(&mut self) {
        self.worker.detach();
    }

    /// Waits for queued writes, then stops the worker.
    pub fn shutdown(&mut self) {
        self.worker.shutdown();
    }
}

fn load_saved(
    user: &str,
    api: &dyn SavedStocksApi,
    retry: RetryPolicy,
) -> Result<Watchlist, StocksError> {
    let what = format!("Loading watchlist of {}", user);
    let stocks = retry.run(&what, || api.get_saved_stocks(user))?;
    Ok(stocks.into_iter().collect())
}

impl WatchlistBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        "saved stocks"
    }

    fn hydrate(&mut self) -> Result<Watchlist, StocksError> {
        load_saved(&self.user, self.api.as_ref(), self.retry)
    }

    fn flush(&mut self, watchlist: &Watchlist) -> Result<(), StocksError> {
        self.worker.submit(watchlist.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use stocks_common::Ticker;

    #[derive(Default)]
    struct FakeApi {
        failures_left: AtomicU32,
        calls: AtomicU32,
        writes: Mutex<Vec<Vec<Ticker>>>,
        gate: Option<(Sender<()>, Receiver<()>)>,
    }

    impl SavedStocksApi for FakeApi {
        fn get_saved_stocks(&self, _user: &str) -> Result<Vec<Ticker>, StocksError> {
            Ok(self.writes.lock()?.last().cloned().unwrap_or_default())
        }

        fn update_saved_stocks(&self, _user: &str, stocks: &[Ticker]) -> Result<(), StocksError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some((entered, release)) = &self.gate {
                let _ = entered.send(());
                let _ = release.recv();
            }
            if self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(StocksError::Remote("transient".to_string()));
            }
            self.writes.lock()?.push(stocks.to_vec());
            Ok(())
        }
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy {
            max_attempts: MAX_FLUSH_ATTEMPTS,
            backoff: Duration::ZERO,
        }
    }

    fn watchlist(symbols: &[&str]) -> Watchlist {
        symbols.iter().map(|s| Ticker::parse(s).unwrap()).collect()
    }

    #[test]
    fn retries_transient_write_failures() {
        let api = Arc::new(FakeApi {
            failures_left: AtomicU32::new(2),
            ..FakeApi::default()
        });
        let mut worker = FlushWorker::start("alice", api.clone(), fast_retry()).unwrap();
        worker.submit(watchlist(&["AAPL"])).unwrap();
        worker.shutdown();

        assert_eq!(api.calls.load(Ordering::SeqCst), 3);
        assert_eq!(api.writes.lock().unwrap().len(), 1);
    }

    #[test]
    fn drops_write_after_three_failures() {
        let api = Arc::new(FakeApi {
            failures_left: AtomicU32::new(10),
            ..FakeApi::default()
        });
        let mut worker = FlushWorker::start("alice", api.clone(), fast_retry()).unwrap();
        worker.submit(watchlist(&["AAPL"])).unwrap();
        worker.shutdown();

        assert_eq!(api.calls.load(Ordering::SeqCst), MAX_FLUSH_ATTEMPTS);
        assert!(api.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn coalesces_queued_snapshots_into_latest() {
        let (entered_tx, entered_rx) = bounded(0);
        let (release_tx, release_rx) = unbounded();
        let api = Arc::new(FakeApi {
            gate: Some((entered_tx, release_rx)),
            ..FakeApi::default()
        });
        let mut worker = FlushWorker::start("alice", api.clone(), fast_retry()).unwrap();

        worker.submit(watchlist(&["AAPL"])).unwrap();
        entered_rx.recv().unwrap();
        worker.submit(watchlist(&["AAPL", "MSFT"])).unwrap();
        worker.submit(watchlist(&["MSFT"])).unwrap();
        release_tx.send(()).unwrap();
        entered_rx.recv().unwrap();
        release_tx.send(()).unwrap();
        worker.shutdown();

        let writes = api.writes.lock().unwrap();
        let expected: Vec<Vec<Ticker>> =
            vec![watchlist(&["AAPL"]).values(), watchlist(&["MSFT"]).values()];
        assert_eq!(*writes, expected);
    }

    #[test]
    fn remote_backend_hydrates_from_saved_stocks() {
        let api = Arc::new(FakeApi::default());
        api.writes.lock().unwrap().push(watchlist(&["MSFT"]).values());

        let mut backend = RemoteBackend::new("alice", api, fast_retry()).unwrap();
        assert_eq!(backend.user(), "alice");
        assert_eq!(backend.hydrate().unwrap(), watchlist(&["MSFT"]));
        backend.shutdown();
    }

    #[test]
    fn background_hydration_reports_its_session() {
        let api = Arc::new(FakeApi::default());
        api.writes.lock().unwrap().push(watchlist(&["MSFT"]).values());
        let mut backend = RemoteBackend::new("alice", api, fast_retry()).unwrap();

        let (tx, rx) = unbounded();
        backend.hydrate_in_background(7, tx).unwrap();
        let hydrated = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(hydrated.session, 7);
        assert_eq!(hydrated.watchlist, Some(watchlist(&["MSFT"])));
        backend.shutdown();
    }

    #[test]
    fn detach_returns_while_a_write_is_in_flight() {
        let (entered_tx, entered_rx) = bounded(0);
        let (release_tx, release_rx) = unbounded();
        let api = Arc::new(FakeApi {
            gate: Some((entered_tx, release_rx)),
            ..FakeApi::default()
        });
        let mut worker = FlushWorker::start("alice", api.clone(), fast_retry()).unwrap();
        worker.submit(watchlist(&["AAPL"])).unwrap();
        entered_rx.recv().unwrap();

        worker.detach();
        assert!(worker.submit(watchlist(&["MSFT"])).is_err());
        assert!(api.writes.lock().unwrap().is_empty());

        release_tx.send(()).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while api.writes.lock().unwrap().is_empty() && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(*api.writes.lock().unwrap(), vec![watchlist(&["AAPL"]).values()]);
    }
}
