//! Error types for NestKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using NestError
pub type Result<T> = std::result::Result<T, NestError>;

/// Unified error type for NestKV operations
#[derive(Debug, Error)]
pub enum NestError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Record log corruption detected: {0}")]
    Corruption(String),

    #[error("Command log error: {0}")]
    CommandLog(String),

    // -------------------------------------------------------------------------
    // Command Errors
    // -------------------------------------------------------------------------
    /// A value that must be an integer was not one
    #[error("Please enter an integer for the value (got `{0}`)")]
    InvalidValue(String),

    /// Wrong argument count, unknown verb or an unusable key
    #[error("Improper syntax: {0}")]
    MalformedCommand(String),

    #[error("NO TRANSACTION")]
    NoOpenTransaction,

    /// A leftover command log has not been replayed or discarded yet
    #[error("Pending transactions from an improper shutdown must be replayed or discarded first")]
    RecoveryPending,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl NestError {
    /// True for errors that reject a command without touching any state.
    ///
    /// The REPL reports these and keeps going; anything else is an I/O or
    /// corruption failure worth surfacing loudly.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            NestError::InvalidValue(_)
                | NestError::MalformedCommand(_)
                | NestError::NoOpenTransaction
                | NestError::RecoveryPending
        )
    }
}
