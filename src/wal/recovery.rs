//! Command Log Recovery
//!
//! Detection of a leftover command log and the bookkeeping of its replay.

use std::path::{Path, PathBuf};

use crate::error::Result;

use super::CommandLogReader;

/// A command log left behind by an improper shutdown
///
/// Its commands are read up front so an operator can inspect them before
/// choosing to replay or discard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecovery {
    /// Location of the leftover log
    pub path: PathBuf,

    /// Complete command lines, in the order they were issued
    pub commands: Vec<String>,

    /// Complete lines that could not be read back (not UTF-8)
    pub damaged: u64,
}

impl PendingRecovery {
    /// Look for a command log at `path`
    pub fn detect(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let mut reader = CommandLogReader::open(path)?;
        let mut commands = Vec::new();
        while let Some(command) = reader.next_command()? {
            commands.push(command);
        }

        Ok(Some(Self {
            path: path.to_path_buf(),
            commands,
            damaged: reader.damaged(),
        }))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Result of replaying a command log
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayResult {
    /// Commands applied successfully
    pub commands_replayed: u64,

    /// Commands rejected (damaged, malformed, or out of place)
    pub commands_rejected: u64,

    /// Open transaction depth once replay finished
    pub depth: usize,
}
