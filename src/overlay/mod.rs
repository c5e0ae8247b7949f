//! Overlay Module
//!
//! In-memory tentative state for open transactions.
//!
//! ## Responsibilities
//! - Hold values written while at least one transaction is open
//! - Shadow committed keys that an open transaction has unset
//! - Drain in key order when the outermost transaction commits
//!
//! ## Data Structure Choice
//! A plain BTreeMap: the engine is single-threaded, and ordered keys make
//! promotion to the record log deterministic.

mod table;

pub use table::Overlay;

/// Entry stored in the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingEntry {
    /// A tentative value
    Value(i64),

    /// A tentative delete of a committed key
    Deleted,
}

impl PendingEntry {
    /// The value this entry makes visible, if any
    pub fn value(self) -> Option<i64> {
        match self {
            PendingEntry::Value(value) => Some(value),
            PendingEntry::Deleted => None,
        }
    }
}
