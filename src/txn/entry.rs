//! Transaction entry definitions
//!
//! One undo/redo record per operation performed inside a transaction.

use crate::overlay::PendingEntry;

/// An operation performed while a scope was innermost
///
/// Both variants capture the overlay entry and the committed value as they
/// were *before* the operation, which is everything rollback needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionEntry {
    /// `SET key value` inside a transaction
    Set {
        key: String,
        value: i64,
        prior_overlay: Option<PendingEntry>,
        prior_main: Option<i64>,
        command: String,
    },

    /// `UNSET key` inside a transaction
    Unset {
        key: String,
        prior_overlay: Option<PendingEntry>,
        prior_main: Option<i64>,
        command: String,
    },
}

impl TransactionEntry {
    pub fn key(&self) -> &str {
        match self {
            TransactionEntry::Set { key, .. } | TransactionEntry::Unset { key, .. } => key,
        }
    }

    /// Overlay entry before this operation (`None` = key was not in the overlay)
    pub fn prior_overlay(&self) -> Option<PendingEntry> {
        match self {
            TransactionEntry::Set { prior_overlay, .. }
            | TransactionEntry::Unset { prior_overlay, .. } => *prior_overlay,
        }
    }

    /// Committed value before this operation
    pub fn prior_main(&self) -> Option<i64> {
        match self {
            TransactionEntry::Set { prior_main, .. }
            | TransactionEntry::Unset { prior_main, .. } => *prior_main,
        }
    }

    /// The value a transactional reader saw before this operation
    pub fn prior_visible(&self) -> Option<i64> {
        match self.prior_overlay() {
            Some(entry) => entry.value(),
            None => self.prior_main(),
        }
    }

    /// Canonical command text, as written to the command log
    pub fn command(&self) -> &str {
        match self {
            TransactionEntry::Set { command, .. } | TransactionEntry::Unset { command, .. } => {
                command
            }
        }
    }
}
