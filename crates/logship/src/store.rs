//! Sled-backed durable storage for unsent log records.
//!
//! The store persists the entire pending queue as a single JSON blob under
//! one fixed key. A full-snapshot key keeps the format trivial and the write
//! atomic at the storage-layer granularity; the cost is an O(n) rewrite per
//! save, acceptable because saves happen only on failed sends and at
//! shutdown, never per record.
//!
//! Persistence is a best-effort safety net, not the primary delivery path:
//! the coordinator logs store errors and carries on, and corrupt data on
//! load is treated as "nothing to recover" rather than a fatal condition.

use std::fs;
use std::path::{Path, PathBuf};

use sled::Db;
use thiserror::Error;
use tracing::warn;

use crate::record::LogRecord;

/// Fixed key holding the JSON-encoded array of pending records.
const PENDING_KEY: &[u8] = b"pending_logs";

/// Errors emitted by the [`DurableStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] sled::Error),
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Wrapper around a sled database holding the pending-record snapshot.
#[derive(Debug, Clone)]
pub struct DurableStore {
    db: Db,
    path: PathBuf,
}

impl DurableStore {
    /// Opens (or creates) the store at the provided directory.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                // sled does not create intermediate directories automatically.
                fs::create_dir_all(parent)?;
            }
        }

        let db = sled::open(&path)?;
        Ok(DurableStore { db, path })
    }

    /// Persists the given records under the fixed key, fully replacing any
    /// prior value. An empty slice deletes the key instead of writing an
    /// empty blob. The write is flushed to disk before returning.
    pub fn save(&self, records: &[LogRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            self.db.remove(PENDING_KEY)?;
        } else {
            let blob = serde_json::to_vec(records)?;
            self.db.insert(PENDING_KEY, blob)?;
        }
        self.db.flush()?;
        Ok(())
    }

    /// Reads the snapshot, deletes the key, and deserializes the records.
    ///
    /// An absent key yields an empty vector. A blob that fails to decode is
    /// discarded with a warning and also yields an empty vector: corrupt
    /// data means "nothing to recover", never a fatal error.
    pub fn load_and_clear(&self) -> Result<Vec<LogRecord>, StoreError> {
        let Some(blob) = self.db.remove(PENDING_KEY)? else {
            return Ok(Vec::new());
        };
        self.db.flush()?;

        match serde_json::from_slice(&blob) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!("discarding corrupt pending-log snapshot: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Deletes the snapshot key unconditionally.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.db.remove(PENDING_KEY)?;
        self.db.flush()?;
        Ok(())
    }

    /// Filesystem location of the backing database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
