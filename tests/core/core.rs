use cluckbook::core::broker::{self, DbBroker};
use cluckbook::core::collection::{load_blob, save_blob};
use cluckbook::core::config;
use cluckbook::core::db;
use cluckbook::core::error::CluckError;
use cluckbook::core::records::{RecordStore, SqliteRecordStore};
use cluckbook::core::schemas;
use cluckbook::core::store::StoreKind;
use cluckbook::{init_project, resolve_store};
use std::collections::BTreeMap;
use std::fs;
use tempfile::tempdir;

#[test]
fn sqlite_store_round_trip_and_revisions() {
    let tmp = tempdir().expect("tempdir");
    let records = SqliteRecordStore::open(tmp.path()).expect("open");
    assert!(db::records_db_path(tmp.path()).exists());

    assert_eq!(records.get(schemas::SHOPS_DATA_KEY).unwrap(), None);
    assert_eq!(records.revision(schemas::SHOPS_DATA_KEY).unwrap(), 0);

    records.set(schemas::SHOPS_DATA_KEY, b"[]").unwrap();
    records.set(schemas::SHOPS_DATA_KEY, b"[1]").unwrap();
    records.set(schemas::FINANCIAL_DATA_KEY, b"[]").unwrap();

    assert_eq!(
        records.get(schemas::SHOPS_DATA_KEY).unwrap().as_deref(),
        Some(&b"[1]"[..])
    );
    assert_eq!(records.revision(schemas::SHOPS_DATA_KEY).unwrap(), 2);
    assert_eq!(records.revision(schemas::FINANCIAL_DATA_KEY).unwrap(), 1);
    assert_eq!(records.revision(schemas::MENU_DATA_KEY).unwrap(), 0);
}

#[test]
fn broker_journals_writes_only() {
    let tmp = tempdir().expect("tempdir");
    let records = SqliteRecordStore::open(tmp.path()).expect("open");
    records.set("k", b"v").unwrap();
    for _ in 0..3 {
        records.get("k").unwrap();
        records.revision("k").unwrap();
    }

    let events = broker::read_audit_log(tmp.path()).unwrap();
    let ops: Vec<_> = events.iter().map(|e| e.op.as_str()).collect();
    assert_eq!(ops, vec!["records.init", "records.set"]);
    assert!(events.iter().all(|e| e.status == "success"));
    assert!(events.iter().all(|e| e.db_id == schemas::RECORDS_DB_NAME));
}

#[test]
fn broker_records_failed_ops() {
    let tmp = tempdir().expect("tempdir");
    db::initialize_records_db(tmp.path()).unwrap();
    let broker = DbBroker::new(tmp.path());

    let result: Result<(), CluckError> =
        broker.with_conn(&db::records_db_path(tmp.path()), "records.bogus", |conn| {
            conn.execute("SELECT * FROM no_such_table", [])?;
            Ok(())
        });
    assert!(matches!(result, Err(CluckError::RusqliteError(_))));

    let last = broker::read_audit_log(tmp.path()).unwrap().pop().unwrap();
    assert_eq!(last.op, "records.bogus");
    assert_eq!(last.status, "error");
}

#[test]
fn unwritable_journal_does_not_fail_committed_writes() {
    let tmp = tempdir().expect("tempdir");
    let records = SqliteRecordStore::open(tmp.path()).expect("open");
    let journal = tmp.path().join(schemas::BROKER_AUDIT_LOG_NAME);
    fs::remove_file(&journal).unwrap();
    fs::create_dir(&journal).unwrap();

    records.set(schemas::SHOPS_DATA_KEY, b"[1]").unwrap();
    assert_eq!(
        records.get(schemas::SHOPS_DATA_KEY).unwrap().as_deref(),
        Some(&b"[1]"[..])
    );
    assert_eq!(records.revision(schemas::SHOPS_DATA_KEY).unwrap(), 1);

    // Store errors still surface
    let broker = DbBroker::new(tmp.path());
    let result: Result<(), CluckError> =
        broker.with_conn(&db::records_db_path(tmp.path()), "records.bogus", |conn| {
            conn.execute("SELECT * FROM no_such_table", [])?;
            Ok(())
        });
    assert!(matches!(result, Err(CluckError::RusqliteError(_))));
}

#[test]
fn blob_codec_round_trips_maps() {
    let tmp = tempdir().expect("tempdir");
    let records = SqliteRecordStore::open(tmp.path()).expect("open");

    let mut map = BTreeMap::new();
    map.insert("01.01.2025".to_string(), vec![1u32, 2]);
    save_blob(&records, "m", &map).unwrap();
    let loaded: BTreeMap<String, Vec<u32>> = load_blob(&records, "m").unwrap();
    assert_eq!(loaded, map);

    let absent: BTreeMap<String, Vec<u32>> = load_blob(&records, "absent").unwrap();
    assert!(absent.is_empty());
}

#[test]
fn init_project_creates_store_and_config() {
    let tmp = tempdir().expect("tempdir");
    let store = init_project(tmp.path()).unwrap();

    assert_eq!(store.kind, StoreKind::Project);
    assert!(store.root.ends_with(".cluckbook/data"));
    assert!(db::records_db_path(&store.root).exists());

    let config_path = store.config_dir().join(schemas::CONFIG_FILE_NAME);
    assert!(config_path.exists());
    let config = config::load_config(store.config_dir()).unwrap();
    assert_eq!(config, config::Config::default());

    // Re-running keeps an edited config
    fs::write(&config_path, "[output]\nformat = \"json\"\n").unwrap();
    init_project(tmp.path()).unwrap();
    assert_eq!(config::load_config(store.config_dir()).unwrap().output.format, "json");
}

#[test]
fn resolve_store_prefers_explicit_then_nearest_project() {
    let tmp = tempdir().expect("tempdir");
    let explicit = tmp.path().join("elsewhere");
    let store = resolve_store(Some(explicit.clone()), tmp.path()).unwrap();
    assert_eq!(store.kind, StoreKind::Custom);
    assert_eq!(store.root, explicit);

    init_project(tmp.path()).unwrap();
    let nested = tmp.path().join("barn").join("loft");
    fs::create_dir_all(&nested).unwrap();
    let store = resolve_store(None, &nested).unwrap();
    assert_eq!(store.kind, StoreKind::Project);
    assert_eq!(store.root, tmp.path().join(".cluckbook").join("data"));
}
