//! Record Log
//!
//! The append-only record file. Every mutation is pushed to stable storage
//! before the call returns.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{NestError, Result};

use super::{encode_record, parse_record, MainIndex, Record, RecordFlag};

/// Outcome of scanning the record log at startup
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadStats {
    /// Keys in the rebuilt index
    pub live: u64,

    /// Records skipped because their flag byte is "deleted"
    pub tombstoned: u64,

    /// Complete lines that could not be decoded (skipped)
    pub corrupted: u64,

    /// Older live records for a key that a later record replaced;
    /// these are tombstoned during the scan
    pub superseded: u64,

    /// Whether a torn final record was cut off
    pub truncated: bool,
}

/// Append-only file of `<flag>,<key>,<value>\n` records
///
/// The file handle stays open for the lifetime of the log. There is one
/// cursor, and every operation positions it explicitly before use.
pub struct RecordLog {
    /// Path of the record file
    path: PathBuf,

    /// Open read/write handle
    file: File,

    /// Current end of file (next append offset)
    len: u64,

    /// Whether writes are fsynced
    sync_strategy: SyncStrategy,
}

impl RecordLog {
    /// Open or create the record file
    pub fn open(path: &Path, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        let len = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file,
            len,
            sync_strategy,
        })
    }

    /// Scan the whole file and rebuild the main index
    ///
    /// - Deleted records are skipped
    /// - A later live record for a key replaces an earlier one (append order);
    ///   the earlier one is tombstoned so only one live record remains
    /// - A final line without its newline is a torn append and is truncated
    /// - Undecodable complete lines are skipped and counted
    pub fn load(&mut self) -> Result<(MainIndex, LoadStats)> {
        let mut index = MainIndex::new();
        let mut stats = LoadStats::default();
        let mut superseded = Vec::new();
        let mut torn_at = None;

        {
            let mut reader = BufReader::new(&self.file);
            reader.seek(SeekFrom::Start(0))?;

            let mut offset = 0u64;
            let mut line = Vec::new();
            loop {
                line.clear();
                let read = reader.read_until(b'\n', &mut line)?;
                if read == 0 {
                    break;
                }

                if line.last() != Some(&b'\n') {
                    torn_at = Some(offset);
                    break;
                }

                match std::str::from_utf8(&line).map_err(|e| e.to_string()).and_then(parse_record) {
                    Ok(record) if record.flag == RecordFlag::Deleted => {
                        stats.tombstoned += 1;
                    }
                    Ok(record) => {
                        let previous = index.insert(
                            record.key.to_string(),
                            Record { value: record.value, offset },
                        );
                        if let Some(previous) = previous {
                            superseded.push(previous.offset);
                        }
                    }
                    Err(reason) => {
                        tracing::warn!(offset, %reason, "skipping corrupted record");
                        stats.corrupted += 1;
                    }
                }

                offset += read as u64;
            }
        }

        if let Some(offset) = torn_at {
            tracing::warn!(
                offset,
                discarded = self.len - offset,
                "truncating torn record at end of {}",
                self.path.display()
            );
            self.file.set_len(offset)?;
            self.persist()?;
            self.len = offset;
            stats.truncated = true;
        }

        for offset in superseded {
            self.tombstone(offset)?;
            stats.superseded += 1;
        }

        stats.live = index.len() as u64;
        Ok((index, stats))
    }

    /// Append a live record at end of file, returning its starting offset
    pub fn append(&mut self, key: &str, value: i64) -> Result<u64> {
        let line = encode_record(key, value);

        let offset = self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(line.as_bytes())?;
        self.persist()?;

        self.len = offset + line.len() as u64;
        tracing::debug!(key, value, offset, "appended record");
        Ok(offset)
    }

    /// Flip the flag byte of the record at `offset` to "deleted"
    ///
    /// The record must currently be live.
    pub fn tombstone(&mut self, offset: u64) -> Result<()> {
        if offset >= self.len {
            return Err(NestError::Corruption(format!(
                "tombstone offset {} beyond end of log ({})",
                offset, self.len
            )));
        }

        let mut flag = [0u8; 1];
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(&mut flag)?;
        if RecordFlag::from_byte(flag[0]) != Some(RecordFlag::Live) {
            return Err(NestError::Corruption(format!(
                "no live record at offset {} (flag byte {:?})",
                offset, flag[0] as char
            )));
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(&[RecordFlag::Deleted.as_byte()])?;
        self.persist()?;

        tracing::debug!(offset, "tombstoned record");
        Ok(())
    }

    /// Force everything written so far to stable storage
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Get the record file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current length of the file in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn persist(&mut self) -> Result<()> {
        match self.sync_strategy {
            SyncStrategy::EveryWrite => self.sync(),
            SyncStrategy::OsBuffered => {
                self.file.flush()?;
                Ok(())
            }
        }
    }
}
