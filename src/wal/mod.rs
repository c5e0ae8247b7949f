//! Command Log (WAL) Module
//!
//! Plain-text log of every command issued while a transaction is open,
//! replayed at startup after an improper shutdown.
//!
//! ## Responsibilities
//! - Append one canonical command line per transactional command, synced
//! - Exist only while the transaction stack is non-empty (or after a crash)
//! - Read back complete lines in order for replay
//!
//! ## File Format
//! ```text
//! BEGIN\n
//! SET a 10\n
//! BEGIN\n
//! UNSET b\n
//! ROLLBACK\n
//! ```
//! A final line without its newline is a torn append and is ignored.

mod writer;
mod reader;
mod recovery;

pub use writer::CommandLog;
pub use reader::CommandLogReader;
pub use recovery::{PendingRecovery, ReplayResult};
