//! Saved watchlists of signed-in users.
//!
//! Writes replace the user's whole set, so repeating a write is a no-op in effect.
//! Reads return the set in sorted order and an empty list for unknown users. When the
//! store is backed by a file, every write rewrites the file through a temporary sibling
//! and a rename so a crash never leaves a half-written store behind.
use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use stocks_common::{StocksError, Ticker};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    users: HashMap<String, BTreeSet<Ticker>>,
}

/// Per-user saved watchlists.
pub struct SavedStocksStore {
    users: Mutex<HashMap<String, BTreeSet<Ticker>>>,
    path: Option<PathBuf>,
}

impl SavedStocksStore {
    /// Store that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            path: None,
        }
    }

    /// Opens a file-backed store, loading existing contents if the file exists.
    pub fn open(path: &Path) -> Result<Self, StocksError> {
        let users = if path.exists() {
            let reader = BufReader::new(File::open(path)?);
            let file: StoreFile = serde_json::from_reader(reader)?;
            info!("Loaded saved watchlists of {} users from {}", file.users.len(), path.display());
            file.users
        } else {
            HashMap::new()
        };
        Ok(Self {
            users: Mutex::new(users),
            path: Some(path.to_path_buf()),
        })
    }

    /// Saved tickers of `user`, sorted.
    pub fn get(&self, user: &str) -> Result<Vec<Ticker>, StocksError> {
        let users = self.users.lock()?;
        Ok(users
            .get(user)
            .map(|stocks| stocks.iter().cloned().collect())
            .unwrap_or_default())
    }

    /// Replaces the saved tickers of `user`.
    pub fn update(&self, user: &str, stocks: Vec<Ticker>) -> Result<(), StocksError> {
        let mut users = self.users.lock()?;
        let stocks: BTreeSet<Ticker> = stocks.into_iter().collect();
        debug!("Saving {} tickers for {}", stocks.len(), user);
        users.insert(user.to_string(), stocks);

        if let Some(path) = &self.path {
            Self::write_file(path, &users)?;
        }
        Ok(())
    }

    fn write_file(
        path: &Path,
        users: &HashMap<String, BTreeSet<Ticker>>,
    ) -> Result<(), StocksError> {
        let tmp = path.with_extension("tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp)?);
            let snapshot = StoreFile { users: users.clone() };
            serde_json::to_writer_pretty(&mut writer, &snapshot)?;
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tickers(symbols: &[&str]) -> Vec<Ticker> {
        symbols.iter().map(|s| Ticker::parse(s).unwrap()).collect()
    }

    #[test]
    fn unknown_user_has_empty_watchlist() {
        let store = SavedStocksStore::in_memory();
        assert!(store.get("nobody").unwrap().is_empty());
    }

    #[test]
    fn update_replaces_and_is_idempotent() {
        let store = SavedStocksStore::in_memory();
        store.update("alice", tickers(&["TSLA", "AAPL"])).unwrap();
        store.update("alice", tickers(&["MSFT"])).unwrap();
        store.update("alice", tickers(&["MSFT"])).unwrap();

        assert_eq!(store.get("alice").unwrap(), tickers(&["MSFT"]));
    }

    #[test]
    fn users_are_isolated() {
        let store = SavedStocksStore::in_memory();
        store.update("alice", tickers(&["AAPL"])).unwrap();
        store.update("bob", tickers(&["NVDA", "AMD"])).unwrap();

        assert_eq!(store.get("alice").unwrap(), tickers(&["AAPL"]));
        assert_eq!(store.get("bob").unwrap(), tickers(&["AMD", "NVDA"]));
    }

    #[test]
    fn file_backed_store_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.json");

        {
            let store = SavedStocksStore::open(&path).unwrap();
            store.update("alice", tickers(&["AAPL", "TSLA"])).unwrap();
        }

        let reopened = SavedStocksStore::open(&path).unwrap();
        assert_eq!(reopened.get("alice").unwrap(), tickers(&["AAPL", "TSLA"]));
    }
}
