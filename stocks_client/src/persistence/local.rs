//! Client-side key-value storage and the guest-mode backend on top of it.
//!
//! `LocalStorage` keeps string values under string keys in a single JSON object file,
//! mirroring the browser `localStorage` contract: `get_item` / `set_item`, synchronous,
//! whole values only. The watchlist is stored under [`LOCAL_STORAGE_KEY`] as a JSON array
//! of tickers.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use stocks_common::{StocksError, Ticker};

use crate::model::watchlist::Watchlist;
use crate::persistence::WatchlistBackend;

/// Key the watchlist is stored under.
pub const LOCAL_STORAGE_KEY: &str = "stocks";

/// File-backed string key-value store.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    /// Storage kept in the file at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value stored under `key`, if any.
    pub fn get_item(&self, key: &str) -> Result<Option<String>, StocksError> {
        Ok(self.read_all()?.remove(key))
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// A backing file that is not a JSON object is replaced by a fresh one.
    pub fn set_item(&self, key: &str, value: &str) -> Result<(), StocksError> {
        let mut items = match self.read_all() {
            Ok(items) => items,
            Err(StocksError::SerdeJson(e)) => {
                warn!("Discarding unreadable storage file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        items.insert(key.to_string(), value.to_string());

        let tmp = self.path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer_pretty(&mut writer, &items)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StocksError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Guest-mode backend.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    storage: LocalStorage,
}

impl LocalBackend {
    /// Backend storing the watchlist in `storage`.
    pub fn new(storage: LocalStorage) -> Self {
        Self { storage }
    }
}

impl WatchlistBackend for LocalBackend {
    fn name(&self) -> &'static str {
        "local storage"
    }

    fn hydrate(&mut self) -> Result<Watchlist, StocksError> {
        let Some(saved) = self.storage.get_item(LOCAL_STORAGE_KEY)? else {
            return Ok(Watchlist::default());
        };
        debug!("Loaded from local storage: {}", saved);
        let tickers: Vec<Ticker> = serde_json::from_str(&saved)?;
        Ok(tickers.into_iter().collect())
    }

    fn flush(&mut self, watchlist: &Watchlist) -> Result<(), StocksError> {
        let encoded = serde_json::to_string(&watchlist.values())?;
        debug!("Updating local storage: {}", encoded);
        self.storage.set_item(LOCAL_STORAGE_KEY, &encoded)
    }
}
