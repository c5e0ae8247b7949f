//! Response definitions
//!
//! Represents results returned to the caller for display.

use std::fmt;

/// Result of a successfully executed command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// A mutation was applied; nothing to print
    Ok,

    /// A committed value
    Value(i64),

    /// No committed value
    Null,

    /// A tentative value from the overlay
    Pending(i64),

    /// An open transaction has unset the key
    PendingUnset,

    /// The key is not in the overlay
    NothingPending,

    /// Result of NUMEQUALTO
    Count(usize),
}

impl Response {
    /// True when there is nothing for a caller to display
    pub fn is_silent(&self) -> bool {
        matches!(self, Response::Ok)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Ok => Ok(()),
            Response::Value(value) | Response::Pending(value) => write!(f, "{}", value),
            Response::Null => f.write_str("NULL"),
            Response::PendingUnset => f.write_str("NULL (pending unset)"),
            Response::NothingPending => f.write_str("Nothing pending"),
            Response::Count(count) => write!(f, "{}", count),
        }
    }
}
