//! Transaction Module
//!
//! Nested transaction scopes and their undo entries.
//!
//! ## Responsibilities
//! - Push a scope on BEGIN; the last scope is always the innermost
//! - Record, per operation, the value visible before it ran
//! - Unwind a scope in reverse order to restore the overlay exactly
//! - Fold a committed inner scope into its parent
//!
//! ## Layout
//! ```text
//! TransactionStack
//! ┌─────────────┐
//! │ Scope 0     │  outermost: [SET a 1, UNSET b]
//! ├─────────────┤
//! │ Scope 1     │  [SET a 2]
//! ├─────────────┤
//! │ Scope 2 ◄── │  innermost (current)
//! └─────────────┘
//! ```

mod entry;
mod stack;

pub use entry::TransactionEntry;
pub use stack::{Scope, TransactionStack};
