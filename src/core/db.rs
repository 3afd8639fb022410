use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};

pub fn db_connect(db_path: &str) -> Result<Connection, error::CluckError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(std::time::Duration::from_secs(5))
        .map_err(error::CluckError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::CluckError::RusqliteError)?;
    Ok(conn)
}

pub fn records_db_path(root: &Path) -> PathBuf {
    root.join(schemas::RECORDS_DB_NAME)
}

pub fn initialize_records_db(root: &Path) -> Result<(), error::CluckError> {
    fs::create_dir_all(root).map_err(|e| {
        error::CluckError::DatabaseInitializationError(format!("{}: {}", root.display(), e))
    })?;

    let broker = DbBroker::new(root);
    broker.with_conn(&records_db_path(root), "records.init", |conn| {
        conn.execute(schemas::RECORDS_DB_SCHEMA, [])?;
        Ok(())
    })
}
