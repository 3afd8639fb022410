//! The record store: a durable mapping from a string key to one serialized blob.
//!
//! Every collection cluckbook keeps (the day ledger, shop entries, sales,
//! settings) lives under a single key and is rewritten whole on each
//! mutation. Each key also carries a revision counter that increments on
//! every successful write, so a front end can poll for changes instead of
//! subscribing to in-memory state.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error::CluckError;
use crate::core::time;
use rusqlite::{OptionalExtension, params};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Key -> bytes storage primitive.
pub trait RecordStore {
    /// Raw bytes stored under `key`, `None` if never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CluckError>;

    /// Replace the bytes under `key`. Failures are returned, never swallowed.
    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), CluckError>;

    /// Number of successful writes to `key` (0 if never written).
    fn revision(&self, key: &str) -> Result<u64, CluckError>;
}

/// SQLite-backed store. One row per key in the `records` table.
pub struct SqliteRecordStore {
    root: PathBuf,
    db_path: PathBuf,
    broker: DbBroker,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the records database under `root`.
    pub fn open(root: &Path) -> Result<Self, CluckError> {
        db::initialize_records_db(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            db_path: db::records_db_path(root),
            broker: DbBroker::new(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RecordStore for SqliteRecordStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CluckError> {
        self.broker.with_read_conn(&self.db_path, "records.get", |conn| {
            let value = conn
                .query_row(
                    "SELECT value FROM records WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, Vec<u8>>(0),
                )
                .optional()?;
            Ok(value)
        })
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), CluckError> {
        let now = time::now_epoch_z();
        self.broker.with_conn(&self.db_path, "records.set", |conn| {
            conn.execute(
                "INSERT INTO records(key, value, revision, updated_at) VALUES(?1, ?2, 1, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    revision = records.revision + 1,
                    updated_at = excluded.updated_at",
                params![key, bytes, now],
            )?;
            Ok(())
        })
    }

    fn revision(&self, key: &str) -> Result<u64, CluckError> {
        self.broker.with_read_conn(&self.db_path, "records.revision", |conn| {
            let rev = conn
                .query_row(
                    "SELECT revision FROM records WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, i64>(0),
                )
                .optional()?;
            Ok(rev.map(|r| r.max(0) as u64).unwrap_or(0))
        })
    }
}

struct StoredBlob {
    bytes: Vec<u8>,
    revision: u64,
}

/// HashMap-backed store for tests and embedding. Nothing touches disk.
#[derive(Default)]
pub struct MemoryRecordStore {
    storage: RwLock<HashMap<String, StoredBlob>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CluckError {
    CluckError::StorageError("lock poisoned".into())
}

impl RecordStore for MemoryRecordStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CluckError> {
        let storage = self.storage.read().map_err(|_| poisoned())?;
        Ok(storage.get(key).map(|blob| blob.bytes.clone()))
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), CluckError> {
        let mut storage = self.storage.write().map_err(|_| poisoned())?;
        let revision = storage.get(key).map(|s| s.revision + 1).unwrap_or(1);
        storage.insert(
            key.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                revision,
            },
        );
        Ok(())
    }

    fn revision(&self, key: &str) -> Result<u64, CluckError> {
        let storage = self.storage.read().map_err(|_| poisoned())?;
        Ok(storage.get(key).map(|blob| blob.revision).unwrap_or(0))
    }
}
