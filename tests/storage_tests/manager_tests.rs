//! Tests for the Storage Manager
//!
//! These tests verify:
//! - Direct-mode put/remove against record log + index
//! - Equal-value puts skip the durable write
//! - At most one live record per key
//! - Reloading reproduces the index

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use nestkv::config::SyncStrategy;
use nestkv::storage::{parse_record, RecordFlag, StorageManager};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_storage() -> (TempDir, PathBuf, StorageManager) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("main.sdb");
    let storage = StorageManager::open(&path, SyncStrategy::EveryWrite).unwrap();
    (temp_dir, path, storage)
}

/// Count live records per key by reading the file directly
fn live_records(path: &Path) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for line in fs::read_to_string(path).unwrap().lines() {
        let record = parse_record(line).unwrap();
        if record.flag == RecordFlag::Live {
            *counts.entry(record.key.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

// =============================================================================
// Put / Remove Tests
// =============================================================================

#[test]
fn test_put_and_get() {
    let (_temp, _path, mut storage) = setup_temp_storage();

    assert!(storage.put("a", 10).unwrap());

    assert_eq!(storage.get("a"), Some(10));
    assert_eq!(storage.get("missing"), None);
}

#[test]
fn test_put_equal_value_writes_once() {
    let (_temp, path, mut storage) = setup_temp_storage();

    assert!(storage.put("k", 5).unwrap());
    assert!(!storage.put("k", 5).unwrap());

    assert_eq!(fs::read_to_string(&path).unwrap(), "0,k,5\n");
}

#[test]
fn test_put_new_value_tombstones_old_record() {
    let (_temp, path, mut storage) = setup_temp_storage();

    storage.put("a", 1).unwrap();
    storage.put("a", 2).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "1,a,1\n0,a,2\n");
    assert_eq!(storage.index().get("a").unwrap().offset, 6);
}

#[test]
fn test_remove() {
    let (_temp, path, mut storage) = setup_temp_storage();
    storage.put("a", 1).unwrap();

    assert!(storage.remove("a").unwrap());
    assert_eq!(storage.get("a"), None);
    assert_eq!(fs::read_to_string(&path).unwrap(), "1,a,1\n");

    assert!(!storage.remove("a").unwrap());
}

#[test]
fn test_count_equal() {
    let (_temp, _path, mut storage) = setup_temp_storage();

    storage.put("a", 1).unwrap();
    storage.put("b", 2).unwrap();
    storage.put("c", 1).unwrap();

    assert_eq!(storage.count_equal(1), 2);
    assert_eq!(storage.count_equal(2), 1);
    assert_eq!(storage.count_equal(3), 0);
}

// =============================================================================
// Durability Tests
// =============================================================================

#[test]
fn test_at_most_one_live_record_per_key() {
    let (_temp, path, mut storage) = setup_temp_storage();
    let keys = ["a", "b", "c"];

    for step in 0..30i64 {
        let key = keys[(step % 3) as usize];
        if step % 4 == 3 {
            storage.remove(key).unwrap();
        } else {
            storage.put(key, step % 5).unwrap();
        }

        for (key, count) in live_records(&path) {
            assert!(count <= 1, "key {} has {} live records", key, count);
        }
    }
}

#[test]
fn test_reload_reproduces_index() {
    let (temp, path, mut storage) = setup_temp_storage();

    storage.put("a", 1).unwrap();
    storage.put("b", 2).unwrap();
    storage.put("a", 3).unwrap();
    storage.remove("b").unwrap();
    storage.put("c", -4).unwrap();
    storage.put("c", -4).unwrap();

    let before: Vec<(String, i64, u64)> = storage
        .index()
        .sorted_entries()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value, storage.index().get(key).unwrap().offset))
        .collect();
    drop(storage);

    let reloaded = StorageManager::open(&path, SyncStrategy::EveryWrite).unwrap();
    let after: Vec<(String, i64, u64)> = reloaded
        .index()
        .sorted_entries()
        .into_iter()
        .map(|(key, value)| (key.to_string(), value, reloaded.index().get(key).unwrap().offset))
        .collect();

    assert_eq!(before, after);
    assert_eq!(reloaded.load_stats().tombstoned, 2);
    drop(temp);
}
