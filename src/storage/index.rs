//! Main index
//!
//! Key → (value, record offset) for every durably committed key.

use std::collections::HashMap;

use super::Record;

/// In-memory index over the live records of the record log
#[derive(Debug, Default, Clone)]
pub struct MainIndex {
    records: HashMap<String, Record>,
}

impl MainIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    /// Committed value of `key`, if any
    pub fn value(&self, key: &str) -> Option<i64> {
        self.records.get(key).map(|record| record.value)
    }

    /// Insert or replace, returning the record that was replaced
    pub fn insert(&mut self, key: String, record: Record) -> Option<Record> {
        self.records.insert(key, record)
    }

    pub fn remove(&mut self, key: &str) -> Option<Record> {
        self.records.remove(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of keys whose committed value equals `value` (full scan)
    pub fn count_equal(&self, value: i64) -> usize {
        self.records.values().filter(|record| record.value == value).count()
    }

    /// All (key, value) pairs sorted by key
    pub fn sorted_entries(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<_> = self
            .records
            .iter()
            .map(|(key, record)| (key.as_str(), record.value))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}
