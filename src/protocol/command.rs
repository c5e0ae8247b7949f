//! Command definitions
//!
//! Represents commands accepted by the engine.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Set,
    Unset,
    Get,
    NumEqualTo,
    Begin,
    Commit,
    Rollback,
}

impl CommandType {
    /// Canonical upper-case verb
    pub fn keyword(self) -> &'static str {
        match self {
            CommandType::Set => "SET",
            CommandType::Unset => "UNSET",
            CommandType::Get => "GET",
            CommandType::NumEqualTo => "NUMEQUALTO",
            CommandType::Begin => "BEGIN",
            CommandType::Commit => "COMMIT",
            CommandType::Rollback => "ROLLBACK",
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Set a key to an integer value
    Set { key: String, value: i64 },

    /// Remove a key
    Unset { key: String },

    /// Read a key; `pending` reads the transaction overlay only
    Get { key: String, pending: bool },

    /// Count committed keys holding a value
    NumEqualTo { value: i64 },

    /// Open a (possibly nested) transaction
    Begin,

    /// Resolve the innermost transaction, or every open one with `all`
    Commit { all: bool },

    /// Discard the innermost transaction
    Rollback,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Set { .. } => CommandType::Set,
            Command::Unset { .. } => CommandType::Unset,
            Command::Get { .. } => CommandType::Get,
            Command::NumEqualTo { .. } => CommandType::NumEqualTo,
            Command::Begin => CommandType::Begin,
            Command::Commit { .. } => CommandType::Commit,
            Command::Rollback => CommandType::Rollback,
        }
    }

    /// Whether the command changes data or transaction state
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Command::Get { .. } | Command::NumEqualTo { .. })
    }
}
