//! Overlay implementation
//!
//! BTreeMap-based table of pending entries.

use std::collections::btree_map;
use std::collections::BTreeMap;

use super::PendingEntry;

/// Pending key → entry mapping, non-empty only while a transaction is open
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overlay {
    entries: BTreeMap<String, PendingEntry>,
}

impl Overlay {
    /// Create a new empty overlay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the pending entry for a key
    pub fn get(&self, key: &str) -> Option<PendingEntry> {
        self.entries.get(key).copied()
    }

    /// Record a tentative value
    pub fn put(&mut self, key: String, value: i64) -> Option<PendingEntry> {
        self.entries.insert(key, PendingEntry::Value(value))
    }

    /// Record a tentative delete of a committed key
    pub fn delete(&mut self, key: String) -> Option<PendingEntry> {
        self.entries.insert(key, PendingEntry::Deleted)
    }

    /// Put back exactly what an undo entry captured
    ///
    /// `None` means the key was absent from the overlay.
    pub fn restore(&mut self, key: &str, prior: Option<PendingEntry>) {
        match prior {
            Some(entry) => {
                self.entries.insert(key.to_string(), entry);
            }
            None => {
                self.entries.remove(key);
            }
        }
    }

    /// Drop a key from the overlay entirely
    pub fn remove(&mut self, key: &str) -> Option<PendingEntry> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, PendingEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), *entry))
    }

    /// Take every entry out in key order, leaving the overlay empty
    pub fn drain(&mut self) -> btree_map::IntoIter<String, PendingEntry> {
        std::mem::take(&mut self.entries).into_iter()
    }

    /// Clear all entries
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
