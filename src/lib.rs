//! # NestKV
//!
//! An embedded key-value store with:
//! - An append-only record log with tombstone deletes and offset indexing
//! - Arbitrarily nested transactions over an in-memory overlay
//! - A command log (WAL) for crash recovery of open transactions
//! - Single-writer, fully synchronous execution
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 REPL / embedding application                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  Command / Response
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                         Engine                               │
//! │        direct mode  ◄── stack empty? ──►  transaction mode   │
//! └──────────┬─────────────────────────────────────┬────────────┘
//!            │                                     │
//!            ▼                          ┌──────────┴──────────┐
//!   ┌─────────────────┐                 ▼                     ▼
//!   │ StorageManager  │         ┌──────────────┐     ┌──────────────┐
//!   │ RecordLog +     │ ◄─commit│   Overlay +  │     │ Command Log  │
//!   │ MainIndex       │         │ Txn Stack    │     │   (WAL)      │
//!   └─────────────────┘         └──────────────┘     └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod overlay;
pub mod txn;
pub mod wal;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{NestError, Result};
pub use config::{Config, RecoveryPolicy, SyncStrategy};
pub use engine::Engine;
pub use protocol::{Command, Response};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of NestKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
