//! Configuration for NestKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::error::{NestError, Result};

/// Main configuration for a NestKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── main.sdb         (append-only record log)
    ///     └── pending.log      (command log, only while transactions are open)
    pub data_dir: PathBuf,

    /// How hard to push each write towards stable storage
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Recovery Configuration
    // -------------------------------------------------------------------------
    /// What to do with a command log left behind by an improper shutdown
    pub recovery_policy: RecoveryPolicy,
}

/// Sync strategy for the record log and the command log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// flush + fsync after every write (safest, the default)
    EveryWrite,

    /// flush to the OS only; a power loss may drop acknowledged writes
    OsBuffered,
}

/// Decision for a command log found at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryPolicy {
    /// Leave the decision to the operator; commands are refused until
    /// `Engine::replay_pending` or `Engine::discard_pending` is called
    Ask,

    /// Replay the command log during open
    Replay,

    /// Delete the command log during open
    Discard,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./nestkv_data"),
            sync_strategy: SyncStrategy::EveryWrite,
            recovery_policy: RecoveryPolicy::Ask,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Reject configurations the engine cannot open
    pub fn validate(&self) -> Result<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(NestError::Config("data_dir must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the recovery policy for a leftover command log
    pub fn recovery_policy(mut self, policy: RecoveryPolicy) -> Self {
        self.config.recovery_policy = policy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
