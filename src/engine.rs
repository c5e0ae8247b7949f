//! Engine Module
//!
//! The transaction and storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Route commands to direct mode (no open transaction) or to the overlay
//! - Keep one undo entry per transactional operation in the innermost scope
//! - Commit and roll back nested scopes
//! - Log transactional commands and replay them after an improper shutdown

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{Config, RecoveryPolicy};
use crate::error::{NestError, Result};
use crate::overlay::{Overlay, PendingEntry};
use crate::protocol::{decode_command, encode_command, Command, Response};
use crate::storage::{validate_key, LoadStats, StorageManager};
use crate::txn::{Scope, TransactionEntry, TransactionStack};
use crate::wal::{CommandLog, PendingRecovery, ReplayResult};

/// Where a command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// Issued by a caller; transactional commands are logged
    Client,

    /// Read back from the command log; never logged again
    Replay,
}

/// The engine: one owned value holding every piece of state
///
/// ## Execution Model: single writer, fully synchronous
///
/// Each command is applied completely, including any fsync, before the
/// next one is accepted. There are no locks; callers that need sharing wrap
/// the engine themselves.
///
/// ## Read Rules
/// - `GET key` reads committed state (the main index)
/// - `GET key PENDING` reads the overlay only
/// - Undo entries capture the *visible* value: overlay first, then main
///
/// ## Commit Rules
/// - An inner COMMIT folds its scope into the parent; nothing is durable yet
/// - The outermost COMMIT (or COMMIT ALL) writes the final overlay value of
///   each key through the direct-mode path, then clears the stack, the
///   overlay and the command log
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Record log + main index
    storage: StorageManager,

    /// Tentative values of the open transactions
    overlay: Overlay,

    /// Open scopes, innermost last
    txns: TransactionStack,

    /// Write side of the command log
    command_log: CommandLog,

    /// Leftover command log awaiting an operator decision
    recovery: Option<PendingRecovery>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const RECORD_FILENAME: &'static str = "main.sdb";
    const COMMAND_LOG_FILENAME: &'static str = "pending.log";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Load the record log into the main index
    /// 3. Detect a leftover command log
    /// 4. Apply the recovery policy (or leave the decision pending)
    pub fn open(config: Config) -> Result<Self> {
        config.validate()?;

        // Step 1: Create data directory if it doesn't exist
        fs::create_dir_all(&config.data_dir)?;

        // Step 2: Load durable state (always safe, idempotent)
        let record_path = config.data_dir.join(Self::RECORD_FILENAME);
        let storage = StorageManager::open(&record_path, config.sync_strategy)?;

        // Step 3: A command log at startup means transactions were open
        // when the process stopped
        let log_path = config.data_dir.join(Self::COMMAND_LOG_FILENAME);
        let recovery = PendingRecovery::detect(&log_path)?;
        if let Some(pending) = &recovery {
            tracing::warn!(
                commands = pending.len(),
                "found command log {} from an improper shutdown",
                log_path.display()
            );
        }

        let mut engine = Self {
            command_log: CommandLog::new(&log_path, config.sync_strategy),
            config,
            storage,
            overlay: Overlay::new(),
            txns: TransactionStack::new(),
            recovery,
        };

        // Step 4: Resolve automatically unless the operator decides
        if engine.recovery.is_some() {
            match engine.config.recovery_policy {
                RecoveryPolicy::Ask => {}
                RecoveryPolicy::Replay => {
                    engine.replay_pending()?;
                }
                RecoveryPolicy::Discard => engine.discard_pending()?,
            }
        }

        Ok(engine)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder().data_dir(path).build();
        Self::open(config)
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    /// The leftover command log, if the operator has not decided yet
    pub fn pending_recovery(&self) -> Option<&PendingRecovery> {
        self.recovery.as_ref()
    }

    /// Replay the leftover command log
    ///
    /// Every line goes back through the normal command path, without being
    /// logged a second time, rebuilding the transaction stack and overlay as
    /// they were at the crash. Undecodable or out-of-place lines are skipped,
    /// including a SET or UNSET with no transaction open to receive it.
    /// The log stays on disk while transactions remain open, since it still
    /// describes them.
    pub fn replay_pending(&mut self) -> Result<ReplayResult> {
        let mut result = ReplayResult::default();
        let pending = match self.recovery.take() {
            Some(pending) => pending,
            None => {
                result.depth = self.depth();
                return Ok(result);
            }
        };
        result.commands_rejected = pending.damaged;

        for line in &pending.commands {
            let outcome = decode_command(line).and_then(|command| self.apply(command, Origin::Replay));
            match outcome {
                Ok(_) => result.commands_replayed += 1,
                Err(e) if e.is_rejection() => {
                    tracing::warn!(command = %line, error = %e, "skipping command during replay");
                    result.commands_rejected += 1;
                }
                Err(e) => return Err(e),
            }
        }

        if self.txns.is_empty() {
            self.finish_transactions()?;
        }

        result.depth = self.depth();
        tracing::info!(
            replayed = result.commands_replayed,
            rejected = result.commands_rejected,
            depth = result.depth,
            "replayed command log"
        );
        Ok(result)
    }

    /// Delete the leftover command log, dropping its uncommitted work
    ///
    /// Direct-mode writes are unaffected: they are already in the record log.
    pub fn discard_pending(&mut self) -> Result<()> {
        if let Some(pending) = self.recovery.take() {
            self.command_log.remove()?;
            tracing::info!(commands = pending.len(), "discarded command log");
        }
        Ok(())
    }

    // =========================================================================
    // Command Interface
    // =========================================================================

    /// Decode and execute one command line
    pub fn execute_line(&mut self, line: &str) -> Result<Response> {
        let command = decode_command(line)?;
        self.execute(command)
    }

    /// Execute a command
    ///
    /// Rejected commands leave every piece of state untouched.
    pub fn execute(&mut self, command: Command) -> Result<Response> {
        self.apply(command, Origin::Client)
    }

    /// Set a key (direct mode, or inside the current transaction)
    pub fn set(&mut self, key: &str, value: i64) -> Result<()> {
        self.execute(Command::Set { key: key.to_string(), value }).map(drop)
    }

    /// Unset a key (direct mode, or inside the current transaction)
    pub fn unset(&mut self, key: &str) -> Result<()> {
        self.execute(Command::Unset { key: key.to_string() }).map(drop)
    }

    /// Committed value of a key
    pub fn get(&self, key: &str) -> Option<i64> {
        self.storage.get(key)
    }

    /// Overlay entry for a key (`None` = nothing pending)
    pub fn get_pending(&self, key: &str) -> Option<PendingEntry> {
        self.overlay.get(key)
    }

    /// Number of committed keys holding `value`
    pub fn num_equal_to(&self, value: i64) -> usize {
        self.storage.count_equal(value)
    }

    /// Open a transaction
    pub fn begin(&mut self) -> Result<()> {
        self.execute(Command::Begin).map(drop)
    }

    /// Commit the innermost transaction
    ///
    /// Only the outermost commit reaches durable storage; an inner commit
    /// hands its changes to the enclosing transaction, so [`Engine::get`]
    /// keeps returning the committed value until then.
    pub fn commit(&mut self) -> Result<()> {
        self.execute(Command::Commit { all: false }).map(drop)
    }

    /// Commit every open transaction
    pub fn commit_all(&mut self) -> Result<()> {
        self.execute(Command::Commit { all: true }).map(drop)
    }

    /// Roll back the innermost transaction
    pub fn rollback(&mut self) -> Result<()> {
        self.execute(Command::Rollback).map(drop)
    }

    /// Close the engine gracefully
    ///
    /// Syncs the record log. Open transactions stay in the command log and
    /// are offered for replay on the next open.
    pub fn close(mut self) -> Result<()> {
        self.storage.sync()?;
        if !self.txns.is_empty() {
            tracing::warn!(depth = self.depth(), "closing with open transactions");
        }
        Ok(())
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    fn apply(&mut self, command: Command, origin: Origin) -> Result<Response> {
        if origin == Origin::Client && self.recovery.is_some() {
            return Err(NestError::RecoveryPending);
        }

        tracing::debug!(?command, ?origin, depth = self.depth(), "executing");

        match command {
            Command::Set { key, value } => self.apply_set(key, value, origin).map(|_| Response::Ok),
            Command::Unset { key } => self.apply_unset(key, origin).map(|_| Response::Ok),
            Command::Get { key, pending: false } => {
                Ok(self.get(&key).map_or(Response::Null, Response::Value))
            }
            Command::Get { key, pending: true } => Ok(match self.overlay.get(&key) {
                Some(PendingEntry::Value(value)) => Response::Pending(value),
                Some(PendingEntry::Deleted) => Response::PendingUnset,
                None => Response::NothingPending,
            }),
            Command::NumEqualTo { value } => Ok(Response::Count(self.num_equal_to(value))),
            Command::Begin => self.apply_begin(origin).map(|_| Response::Ok),
            Command::Commit { all: false } => self.apply_commit(origin).map(|_| Response::Ok),
            Command::Commit { all: true } => self.apply_commit_all(origin).map(|_| Response::Ok),
            Command::Rollback => self.apply_rollback(origin).map(|_| Response::Ok),
        }
    }

    fn apply_set(&mut self, key: String, value: i64, origin: Origin) -> Result<()> {
        validate_key(&key)?;

        if self.txns.is_empty() {
            self.require_direct(origin)?;
            self.storage.put(&key, value)?;
            return Ok(());
        }

        let entry = TransactionEntry::Set {
            prior_overlay: self.overlay.get(&key),
            prior_main: self.storage.get(&key),
            command: encode_command(&Command::Set { key: key.clone(), value }),
            key: key.clone(),
            value,
        };

        self.log_command(entry.command(), origin)?;
        self.current_scope()?.push(entry);
        self.overlay.put(key, value);
        Ok(())
    }

    fn apply_unset(&mut self, key: String, origin: Origin) -> Result<()> {
        validate_key(&key)?;

        if self.txns.is_empty() {
            self.require_direct(origin)?;
            self.storage.remove(&key)?;
            return Ok(());
        }

        let prior_overlay = self.overlay.get(&key);
        let prior_main = self.storage.get(&key);
        let visible = match prior_overlay {
            Some(entry) => entry.value(),
            None => prior_main,
        };
        if visible.is_none() {
            return Ok(());
        }

        let entry = TransactionEntry::Unset {
            command: encode_command(&Command::Unset { key: key.clone() }),
            key: key.clone(),
            prior_overlay,
            prior_main,
        };

        self.log_command(entry.command(), origin)?;
        self.current_scope()?.push(entry);
        if prior_main.is_some() {
            self.overlay.delete(key);
        } else {
            self.overlay.remove(&key);
        }
        Ok(())
    }

    fn apply_begin(&mut self, origin: Origin) -> Result<()> {
        self.log_command(&encode_command(&Command::Begin), origin)?;
        self.txns.begin();
        tracing::debug!(depth = self.depth(), "transaction opened");
        Ok(())
    }

    /// GET reads committed state only: after an inner commit the folded
    /// values are still visible through `GET key PENDING` alone.
    fn apply_commit(&mut self, origin: Origin) -> Result<()> {
        if self.txns.is_empty() {
            return Err(NestError::NoOpenTransaction);
        }

        // Logged before acting: a crash past this point replays the commit
        self.log_command(&encode_command(&Command::Commit { all: false }), origin)?;

        let scope = self.txns.pop().ok_or(NestError::NoOpenTransaction)?;
        if let Some(parent) = self.txns.current_mut() {
            let folded = scope.len();
            parent.absorb(scope);
            tracing::debug!(folded, depth = self.depth(), "inner transaction committed");
            return Ok(());
        }

        self.promote_overlay()?;
        self.finish_transactions()
    }

    fn apply_commit_all(&mut self, origin: Origin) -> Result<()> {
        if !self.txns.is_empty() {
            self.log_command(&encode_command(&Command::Commit { all: true }), origin)?;
            self.promote_overlay()?;
        }
        self.finish_transactions()
    }

    fn apply_rollback(&mut self, origin: Origin) -> Result<()> {
        if self.txns.is_empty() {
            return Err(NestError::NoOpenTransaction);
        }

        self.log_command(&encode_command(&Command::Rollback), origin)?;

        let scope = self.txns.pop().ok_or(NestError::NoOpenTransaction)?;
        let undone = scope.len();
        scope.unwind(&mut self.overlay);
        tracing::debug!(undone, depth = self.depth(), "transaction rolled back");

        if self.txns.is_empty() {
            self.finish_transactions()?;
        }
        Ok(())
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    /// Write the final overlay value of every key to durable storage
    fn promote_overlay(&mut self) -> Result<()> {
        let mut written = 0usize;
        for (key, entry) in self.overlay.drain() {
            let changed = match entry {
                PendingEntry::Value(value) => self.storage.put(&key, value)?,
                PendingEntry::Deleted => self.storage.remove(&key)?,
            };
            if changed {
                written += 1;
            }
        }
        tracing::debug!(written, "promoted overlay to record log");
        Ok(())
    }

    /// Drop all transaction state and the command log
    ///
    /// The in-memory state is cleared even when the log cannot be deleted;
    /// the writer then starts the next transaction on an emptied file.
    fn finish_transactions(&mut self) -> Result<()> {
        let removed = self.command_log.remove();
        self.txns.clear();
        self.overlay.clear();
        removed.map(drop)
    }

    /// Every logged SET or UNSET was issued inside a transaction; one that
    /// replays with no scope open must not reach the record log
    fn require_direct(&self, origin: Origin) -> Result<()> {
        match origin {
            Origin::Client => Ok(()),
            Origin::Replay => Err(NestError::NoOpenTransaction),
        }
    }

    fn log_command(&mut self, command: &str, origin: Origin) -> Result<()> {
        match origin {
            Origin::Client => self.command_log.append(command),
            Origin::Replay => Ok(()),
        }
    }

    fn current_scope(&mut self) -> Result<&mut Scope> {
        self.txns.current_mut().ok_or(NestError::NoOpenTransaction)
    }

    // =========================================================================
    // Accessors (for display, testing and debugging)
    // =========================================================================

    /// Number of open transactions
    pub fn depth(&self) -> usize {
        self.txns.depth()
    }

    pub fn in_transaction(&self) -> bool {
        !self.txns.is_empty()
    }

    /// Open scopes, outermost first
    pub fn scopes(&self) -> &[Scope] {
        self.txns.scopes()
    }

    /// Committed (key, value) pairs sorted by key
    pub fn entries(&self) -> Vec<(&str, i64)> {
        self.storage.index().sorted_entries()
    }

    /// Read-only view of the overlay
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    /// Statistics from loading the record log
    pub fn load_stats(&self) -> &LoadStats {
        self.storage.load_stats()
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the record log path
    pub fn record_path(&self) -> &Path {
        self.storage.record_path()
    }

    /// Get the command log path
    pub fn command_log_path(&self) -> PathBuf {
        self.command_log.path().to_path_buf()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
