//! Database schema and storage key definitions.
//!
//! cluckbook keeps every collection as one serialized blob in a single
//! key-value table. The keys below are the only rows ever written.

pub const RECORDS_DB_NAME: &str = "cluckbook.db";

pub const RECORDS_DB_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS records (
        key TEXT PRIMARY KEY,
        value BLOB NOT NULL,
        revision INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    )
";

pub const BROKER_AUDIT_LOG_NAME: &str = "broker.events.jsonl";

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Date -> DayRecord mapping (events and reminders).
pub const MENU_DATA_KEY: &str = "menu_data";
/// Flat list of shop entries across all shop types.
pub const SHOPS_DATA_KEY: &str = "shops_data";
/// Append-only list of sale records.
pub const FINANCIAL_DATA_KEY: &str = "financial_data";
/// Reminder toggle and display preferences.
pub const SETTINGS_DATA_KEY: &str = "settings_data";

pub const ALL_KEYS: [&str; 4] = [
    MENU_DATA_KEY,
    SHOPS_DATA_KEY,
    FINANCIAL_DATA_KEY,
    SETTINGS_DATA_KEY,
];
