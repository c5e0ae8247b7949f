//! Storage Module
//!
//! Durable storage layer: a single append-only text file of records plus the
//! in-memory index rebuilt from it at startup.
//!
//! ## Responsibilities
//! - Append records and force them to stable storage
//! - Tombstone records in place (flag byte flip, no resize)
//! - Rebuild the main index by scanning the file from the start
//! - Apply direct-mode SET/UNSET (tombstone old record, append new one)
//!
//! ## File Format
//! ```text
//! ┌────────┬───┬──────────┬───┬──────────────┬────┐
//! │Flag (1)│ , │   Key    │ , │ Value (i64)  │ \n │
//! └────────┴───┴──────────┴───┴──────────────┴────┘
//!   '0' = live, '1' = deleted
//! ```
//!
//! A record's byte offset is its handle: the main index keeps it so the
//! flag byte can be rewritten later without searching the file.

mod record;
mod record_log;
mod index;
mod manager;

pub use record::{encode_record, parse_record, validate_key, ParsedRecord, Record, RecordFlag};
pub use record_log::{LoadStats, RecordLog};
pub use index::MainIndex;
pub use manager::StorageManager;
