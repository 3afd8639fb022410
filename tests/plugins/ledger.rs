use chrono::{NaiveDate, NaiveTime};
use cluckbook::core::error::CluckError;
use cluckbook::core::records::{MemoryRecordStore, RecordStore, SqliteRecordStore};
use cluckbook::core::schemas;
use cluckbook::plugins::ledger::{
    EventType, ReminderEdit, active_days, add_reminder, edit_reminder, get_event, load_day,
    remove_event, remove_reminder, upsert_event,
};
use tempfile::tempdir;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn test_ledger_lifecycle_on_sqlite() {
    let tmp = tempdir().unwrap();
    let records = SqliteRecordStore::open(tmp.path()).unwrap();
    let date = day(2025, 7, 24);

    // 1. Unseen day is empty
    assert!(load_day(&records, date).unwrap().is_empty());

    // 2. Record counts
    let eggs = upsert_event(&records, EventType::Eggs, 18, date).unwrap();
    upsert_event(&records, EventType::Hens, 6, date).unwrap();

    // 3. Add reminders in order
    let first = add_reminder(&records, "Order feed", at(9, 0), date).unwrap();
    let second = add_reminder(&records, "Clean waterers", at(8, 0), date).unwrap();

    let loaded = load_day(&records, date).unwrap();
    assert_eq!(loaded.events.len(), 2);
    assert_eq!(loaded.event(EventType::Eggs).unwrap(), &eggs);
    let names: Vec<_> = loaded.reminders.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Order feed", "Clean waterers"]);

    // 4. Remove
    assert!(remove_event(&records, &eggs.id, date).unwrap());
    assert!(remove_reminder(&records, &first.id, date).unwrap());
    let loaded = load_day(&records, date).unwrap();
    assert!(loaded.event(EventType::Eggs).is_none());
    assert_eq!(loaded.reminders, vec![second]);

    // 5. Survives reopening the store
    drop(records);
    let reopened = SqliteRecordStore::open(tmp.path()).unwrap();
    assert_eq!(load_day(&reopened, date).unwrap(), loaded);
}

#[test]
fn test_days_are_independent() {
    let records = MemoryRecordStore::new();
    let d1 = day(2025, 3, 1);
    let d2 = day(2025, 3, 2);

    upsert_event(&records, EventType::Eggs, 10, d1).unwrap();
    let before = load_day(&records, d2).unwrap();

    upsert_event(&records, EventType::Eggs, 99, d2).unwrap();
    add_reminder(&records, "Check nest boxes", at(7, 30), d2).unwrap();

    assert_eq!(get_event(&records, EventType::Eggs, d1).unwrap().unwrap().count, 10);
    assert!(before.is_empty());
    assert_eq!(active_days(&records).unwrap(), vec![d1, d2]);
}

#[test]
fn test_upsert_same_type_keeps_single_event_and_identity() {
    let records = MemoryRecordStore::new();
    let date = day(2025, 3, 1);

    let original = upsert_event(&records, EventType::Eggs, 10, date).unwrap();
    let replaced = upsert_event(&records, EventType::Eggs, 14, date).unwrap();

    assert_eq!(replaced.count, 14);
    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.created_at, original.created_at);

    let loaded = load_day(&records, date).unwrap();
    let eggs: Vec<_> = loaded
        .events
        .iter()
        .filter(|e| e.kind == EventType::Eggs)
        .collect();
    assert_eq!(eggs.len(), 1);
    assert_eq!(eggs[0].count, 14);
}

#[test]
fn test_remove_unknown_ids_is_noop() {
    let records = MemoryRecordStore::new();
    let date = day(2025, 3, 1);
    upsert_event(&records, EventType::Hens, 5, date).unwrap();
    add_reminder(&records, "Vaccinate pullets", at(10, 0), date).unwrap();

    let before = load_day(&records, date).unwrap();
    let rev = records.revision(schemas::MENU_DATA_KEY).unwrap();

    assert!(!remove_event(&records, "nope", date).unwrap());
    assert!(!remove_reminder(&records, "nope", date).unwrap());
    // Right id, wrong day
    assert!(!remove_event(&records, &before.events[0].id, day(2025, 3, 2)).unwrap());

    assert_eq!(load_day(&records, date).unwrap(), before);
    assert_eq!(records.revision(schemas::MENU_DATA_KEY).unwrap(), rev);
}

#[test]
fn test_edit_reminder_in_place() {
    let records = MemoryRecordStore::new();
    let date = day(2025, 4, 10);
    let a = add_reminder(&records, "A", at(6, 0), date).unwrap();
    let b = add_reminder(&records, "B", at(7, 0), date).unwrap();

    let edited = edit_reminder(
        &records,
        &a.id,
        date,
        ReminderEdit {
            name: Some("A2".into()),
            time: Some(at(18, 45)),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(edited.id, a.id);
    assert_eq!(edited.created_at, a.created_at);
    assert_eq!(edited.name, "A2");
    assert_eq!(edited.time, at(18, 45));

    let loaded = load_day(&records, date).unwrap();
    assert_eq!(loaded.reminders[0], edited);
    assert_eq!(loaded.reminders[1], b);

    let rename = |name: &str| ReminderEdit {
        name: Some(name.into()),
        ..Default::default()
    };
    assert!(edit_reminder(&records, "missing", date, rename("x")).unwrap().is_none());
    assert!(edit_reminder(&records, "missing", date, rename(" ")).unwrap().is_none());
    let err = edit_reminder(&records, &a.id, date, rename(" ")).unwrap_err();
    assert!(matches!(err, CluckError::ValidationError(_)));
}

#[test]
fn test_edit_reminder_moves_to_another_day() {
    let records = MemoryRecordStore::new();
    let from = day(2025, 4, 10);
    let to = day(2025, 4, 12);
    let keep = add_reminder(&records, "Keep", at(6, 0), from).unwrap();
    let moving = add_reminder(&records, "Move", at(7, 0), from).unwrap();
    let existing = add_reminder(&records, "Already there", at(8, 0), to).unwrap();

    let moved = edit_reminder(
        &records,
        &moving.id,
        from,
        ReminderEdit {
            date: Some(to),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(moved.id, moving.id);
    assert_eq!(moved.date, to);
    assert_eq!(moved.created_at, moving.created_at);

    assert_eq!(load_day(&records, from).unwrap().reminders, vec![keep]);
    assert_eq!(load_day(&records, to).unwrap().reminders, vec![existing, moved]);

    // Looked up on the old day it is gone; nothing is written
    let rev = records.revision(schemas::MENU_DATA_KEY).unwrap();
    let again = edit_reminder(
        &records,
        &moving.id,
        from,
        ReminderEdit {
            date: Some(to),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(again.is_none());
    assert_eq!(records.revision(schemas::MENU_DATA_KEY).unwrap(), rev);
}

#[test]
fn test_corrupt_menu_blob_reads_empty_then_recovers() {
    let records = MemoryRecordStore::new();
    records.set(schemas::MENU_DATA_KEY, b"[1, 2, 3").unwrap();
    let date = day(2025, 1, 1);

    assert!(load_day(&records, date).unwrap().is_empty());
    assert!(active_days(&records).unwrap().is_empty());

    upsert_event(&records, EventType::Eggs, 3, date).unwrap();
    assert_eq!(get_event(&records, EventType::Eggs, date).unwrap().unwrap().count, 3);
}

#[test]
fn test_day_key_layout_on_disk() {
    let records = MemoryRecordStore::new();
    upsert_event(&records, EventType::Eggs, 1, day(2025, 2, 3)).unwrap();
    let raw = records.get(schemas::MENU_DATA_KEY).unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert!(json.get("03.02.2025").is_some());
    assert_eq!(json["03.02.2025"]["events"][0]["type"], "eggs");
}

struct ReadOnlyStore(MemoryRecordStore);

impl RecordStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CluckError> {
        self.0.get(key)
    }
    fn set(&self, _key: &str, _bytes: &[u8]) -> Result<(), CluckError> {
        Err(CluckError::StorageError("disk full".into()))
    }
    fn revision(&self, key: &str) -> Result<u64, CluckError> {
        self.0.revision(key)
    }
}

#[test]
fn test_write_failures_are_surfaced() {
    let records = ReadOnlyStore(MemoryRecordStore::new());
    let date = day(2025, 1, 1);
    let err = upsert_event(&records, EventType::Eggs, 3, date).unwrap_err();
    assert!(matches!(err, CluckError::StorageError(_)));
    assert!(load_day(&records, date).unwrap().is_empty());
}
