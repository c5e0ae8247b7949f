//! Storage Manager
//!
//! Pairs the record log with the main index and applies direct-mode
//! mutations to both.
//!
//! ## Responsibilities
//! - Rebuild the main index from the record log on open
//! - SET: tombstone the old record (if any), then append the new one
//! - UNSET: tombstone the record and drop the index entry
//! - Skip durable writes that would not change the committed value

use std::path::Path;

use crate::config::SyncStrategy;
use crate::error::Result;

use super::{LoadStats, MainIndex, Record, RecordLog};

/// Durable key-value state: record log + main index
///
/// Invariant: every index entry points at the single live record for its
/// key, and every live record in the file is referenced by the index.
pub struct StorageManager {
    /// Append-only record file
    log: RecordLog,

    /// Committed keys → (value, offset)
    index: MainIndex,

    /// What the startup scan found
    load_stats: LoadStats,
}

impl StorageManager {
    /// Open or create the record log at `path` and load it
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let mut log = RecordLog::open(path, sync_strategy)?;
        let (index, load_stats) = log.load()?;

        tracing::info!(
            live = load_stats.live,
            tombstoned = load_stats.tombstoned,
            corrupted = load_stats.corrupted,
            superseded = load_stats.superseded,
            truncated = load_stats.truncated,
            "loaded record log {}",
            path.display()
        );

        Ok(Self {
            log,
            index,
            load_stats,
        })
    }

    /// Committed value for `key`
    pub fn get(&self, key: &str) -> Option<i64> {
        self.index.value(key)
    }

    /// Durably set `key` to `value`
    ///
    /// Returns `false` when the key already holds `value` and nothing was
    /// written.
    pub fn put(&mut self, key: &str, value: i64) -> Result<bool> {
        if let Some(existing) = self.index.get(key) {
            if existing.value == value {
                return Ok(false);
            }
            let offset = existing.offset;
            self.log.tombstone(offset)?;
            // The old record is gone on disk; keep the index in step until
            // the replacement lands.
            self.index.remove(key);
        }

        let offset = self.log.append(key, value)?;
        self.index.insert(key.to_string(), Record { value, offset });
        Ok(true)
    }

    /// Durably remove `key`
    ///
    /// Returns `false` when the key was not present.
    pub fn remove(&mut self, key: &str) -> Result<bool> {
        let offset = match self.index.get(key) {
            Some(record) => record.offset,
            None => return Ok(false),
        };

        self.log.tombstone(offset)?;
        self.index.remove(key);
        Ok(true)
    }

    /// Number of committed keys holding `value`
    pub fn count_equal(&self, value: i64) -> usize {
        self.index.count_equal(value)
    }

    /// Read-only view of the main index
    pub fn index(&self) -> &MainIndex {
        &self.index
    }

    /// Force the record log to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.log.sync()
    }

    /// Statistics from the startup scan
    pub fn load_stats(&self) -> &LoadStats {
        &self.load_stats
    }

    /// Get the record file path
    pub fn record_path(&self) -> &Path {
        self.log.path()
    }
}
