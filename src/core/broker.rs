use crate::core::db;
use crate::core::error;
use crate::core::schemas;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// The DB Broker is the single door to the records database.
/// Every access is serialized in-process; writes are journaled to `broker.events.jsonl`.
pub struct DbBroker {
    audit_log_path: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl DbBroker {
    pub fn new(root: &Path) -> Self {
        Self {
            audit_log_path: root.join(schemas::BROKER_AUDIT_LOG_NAME),
        }
    }

    pub fn audit_log_path(&self) -> &Path {
        &self.audit_log_path
    }

    /// Execute a mutating closure with a serialized connection and journal it.
    ///
    /// The journal line is written after the closure has run. A journal
    /// failure is logged and never replaces the closure's result.
    pub fn with_conn<F, R>(&self, db_path: &Path, op_name: &str, f: F) -> Result<R, error::CluckError>
    where
        F: FnOnce(&Connection) -> Result<R, error::CluckError>,
    {
        self.run(db_path, op_name, true, f)
    }

    /// Execute a read-only closure with a serialized connection. Reads are not journaled.
    pub fn with_read_conn<F, R>(&self, db_path: &Path, op_name: &str, f: F) -> Result<R, error::CluckError>
    where
        F: FnOnce(&Connection) -> Result<R, error::CluckError>,
    {
        self.run(db_path, op_name, false, f)
    }

    fn run<F, R>(&self, db_path: &Path, op_name: &str, journal: bool, f: F) -> Result<R, error::CluckError>
    where
        F: FnOnce(&Connection) -> Result<R, error::CluckError>,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let conn = db::db_connect(&db_path.to_string_lossy())?;

        let result = f(&conn);

        let status = if result.is_ok() { "success" } else { "error" };
        tracing::debug!(op = op_name, db = %db_id, status, "broker op");
        if journal && let Err(e) = self.log_event(op_name, &db_id, status) {
            tracing::warn!(
                op = op_name,
                path = %self.audit_log_path.display(),
                error = %e,
                "failed to append broker journal"
            );
        }

        result
    }

    fn log_event(&self, op: &str, db_id: &str, status: &str) -> Result<(), error::CluckError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
        };

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::CluckError::IoError)?;

        writeln!(f, "{}", serde_json::to_string(&ev)?).map_err(error::CluckError::IoError)?;
        Ok(())
    }
}

/// Read the audit journal back, skipping lines that do not parse.
pub fn read_audit_log(root: &Path) -> Result<Vec<BrokerEvent>, error::CluckError> {
    let path = root.join(schemas::BROKER_AUDIT_LOG_NAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str::<BrokerEvent>(line).ok())
        .collect())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "broker",
        "version": "0.1.0",
        "description": "Serialized access to the records database with an append-only journal of writes",
        "commands": [
            { "name": "status", "description": "Show per-key revisions of the records table" }
        ],
        "storage": [schemas::BROKER_AUDIT_LOG_NAME]
    })
}
