use cluckbook::core::records::{MemoryRecordStore, RecordStore, SqliteRecordStore};
use cluckbook::core::schemas;
use cluckbook::plugins::shops::{
    ShopEntry, ShopEntryUpdate, ShopType, StockFigures, add_entry, all_stats, edit_entry,
    entries_by_type, get_entry, list_entries, remove_entry, stats_by_type, update_entry,
};
use tempfile::tempdir;

fn figures(eggs_stock: u32, eggs_sold: u32) -> StockFigures {
    StockFigures {
        eggs_stock,
        eggs_sold,
        ..Default::default()
    }
}

#[test]
fn test_add_then_get_round_trips() {
    let tmp = tempdir().unwrap();
    let records = SqliteRecordStore::open(tmp.path()).unwrap();

    let entry = ShopEntry::new(
        "Village shop",
        ShopType::Shop,
        StockFigures {
            eggs_stock: 120,
            eggs_sold: 30,
            chickens_stock: 8,
            chickens_sold: 2,
        },
    );
    add_entry(&records, entry.clone()).unwrap();

    assert_eq!(get_entry(&records, &entry.id).unwrap(), Some(entry.clone()));
    assert_eq!(list_entries(&records).unwrap(), vec![entry]);
    assert_eq!(get_entry(&records, "missing").unwrap(), None);
}

#[test]
fn test_stats_by_type_sums_clamped_availability() {
    let records = MemoryRecordStore::new();
    add_entry(&records, ShopEntry::new("A", ShopType::Shop, figures(10, 2))).unwrap();
    add_entry(&records, ShopEntry::new("B", ShopType::Shop, figures(5, 5))).unwrap();
    add_entry(&records, ShopEntry::new("C", ShopType::Shop, figures(3, 10))).unwrap();
    add_entry(&records, ShopEntry::new("D", ShopType::Market, figures(50, 0))).unwrap();

    let shop = stats_by_type(&records, ShopType::Shop).unwrap();
    assert_eq!(shop.total_available_eggs, 8);
    assert_eq!(shop.entries_count, 3);

    let online = stats_by_type(&records, ShopType::Online).unwrap();
    assert_eq!(online.entries_count, 0);
    assert_eq!(online.total_available_eggs, 0);
}

#[test]
fn test_all_stats_in_declaration_order_and_idempotent() {
    let records = MemoryRecordStore::new();
    add_entry(&records, ShopEntry::new("M", ShopType::Market, figures(7, 1))).unwrap();
    add_entry(&records, ShopEntry::new("O", ShopType::Online, figures(4, 0))).unwrap();

    let first = all_stats(&records).unwrap();
    let kinds: Vec<_> = first.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![ShopType::Shop, ShopType::Online, ShopType::Market]);
    assert_eq!(first[1].total_available_eggs, 4);
    assert_eq!(first[2].total_available_eggs, 6);

    let second = all_stats(&records).unwrap();
    assert_eq!(first, second);
    // Reads never write
    assert_eq!(records.revision(schemas::SHOPS_DATA_KEY).unwrap(), 2);
}

#[test]
fn test_update_preserves_identity_fields() {
    let records = MemoryRecordStore::new();
    let original = add_entry(&records, ShopEntry::new("Stall", ShopType::Market, figures(10, 0))).unwrap();

    // A replacement that tries to change the type and creation time
    let mut replacement = ShopEntry::new("Stall 2", ShopType::Online, figures(20, 5));
    replacement.id = original.id.clone();
    assert!(update_entry(&records, replacement).unwrap());

    let stored = get_entry(&records, &original.id).unwrap().unwrap();
    assert_eq!(stored.name, "Stall 2");
    assert_eq!(stored.eggs_stock, 20);
    assert_eq!(stored.kind, ShopType::Market);
    assert_eq!(stored.created_at, original.created_at);
    assert_eq!(entries_by_type(&records, ShopType::Online).unwrap().len(), 0);
}

#[test]
fn test_edit_and_remove_missing_are_noops() {
    let records = MemoryRecordStore::new();
    let kept = add_entry(&records, ShopEntry::new("Kept", ShopType::Shop, figures(1, 0))).unwrap();
    let rev = records.revision(schemas::SHOPS_DATA_KEY).unwrap();

    let update = ShopEntryUpdate {
        eggs_sold: Some(1),
        ..Default::default()
    };
    assert!(edit_entry(&records, "missing", update).unwrap().is_none());
    assert!(!remove_entry(&records, "missing").unwrap());

    let mut ghost = ShopEntry::new("Ghost", ShopType::Shop, figures(1, 0));
    ghost.id = "missing".to_string();
    assert!(!update_entry(&records, ghost).unwrap());

    assert_eq!(records.revision(schemas::SHOPS_DATA_KEY).unwrap(), rev);
    assert_eq!(list_entries(&records).unwrap(), vec![kept]);
}

#[test]
fn test_edit_then_remove() {
    let records = MemoryRecordStore::new();
    let entry = add_entry(&records, ShopEntry::new("Farm gate", ShopType::Shop, figures(30, 0))).unwrap();

    let edited = edit_entry(
        &records,
        &entry.id,
        ShopEntryUpdate {
            eggs_sold: Some(12),
            chickens_stock: Some(3),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(edited.available_eggs(), 18);
    assert_eq!(edited.available_chickens(), 3);
    assert_eq!(edited.name, "Farm gate");

    assert!(remove_entry(&records, &entry.id).unwrap());
    assert!(list_entries(&records).unwrap().is_empty());
    assert_eq!(stats_by_type(&records, ShopType::Shop).unwrap().entries_count, 0);
}

#[test]
fn test_blank_name_on_missing_id_is_noop() {
    let records = MemoryRecordStore::new();
    let mut ghost = ShopEntry::new("Ghost", ShopType::Online, figures(1, 0));
    ghost.id = "missing".to_string();
    ghost.name = "   ".to_string();
    assert!(!update_entry(&records, ghost).unwrap());

    let blank = ShopEntryUpdate {
        name: Some(" ".into()),
        ..Default::default()
    };
    assert!(edit_entry(&records, "missing", blank.clone()).unwrap().is_none());

    // On an existing entry the blank name is still rejected and nothing changes
    let kept = add_entry(&records, ShopEntry::new("Kept", ShopType::Shop, figures(1, 0))).unwrap();
    assert!(edit_entry(&records, &kept.id, blank).is_err());
    assert_eq!(get_entry(&records, &kept.id).unwrap(), Some(kept));
    assert_eq!(records.revision(schemas::SHOPS_DATA_KEY).unwrap(), 1);
}

#[test]
fn test_empty_name_rejected() {
    let records = MemoryRecordStore::new();
    assert!(add_entry(&records, ShopEntry::new("  ", ShopType::Shop, figures(1, 0))).is_err());
    assert!(list_entries(&records).unwrap().is_empty());
}
