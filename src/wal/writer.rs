//! Command Log Writer
//!
//! Handles appending command lines to the command log file.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::SyncStrategy;
use crate::error::{NestError, Result};

/// Writes command lines to the command log
///
/// The file is created lazily by the first append and deleted by
/// [`CommandLog::remove`] when the last open transaction is resolved.
pub struct CommandLog {
    /// Location of the log file
    path: PathBuf,

    /// Append handle, opened on first use
    file: Option<File>,

    /// Whether appends are fsynced
    sync_strategy: SyncStrategy,

    /// Lines appended through this writer
    appended: u64,

    /// Set once the transactions a file described are finished: the next
    /// open empties whatever is still on disk instead of extending it
    truncate_on_open: bool,
}

impl CommandLog {
    /// Prepare a writer for `path` without touching the file system
    ///
    /// A log already at `path` (one being replayed) is extended.
    pub fn new(path: &Path, sync_strategy: SyncStrategy) -> Self {
        Self {
            path: path.to_path_buf(),
            file: None,
            sync_strategy,
            appended: 0,
            truncate_on_open: false,
        }
    }

    /// Append one command line and push it to stable storage
    pub fn append(&mut self, command: &str) -> Result<()> {
        if command.contains('\n') {
            return Err(NestError::CommandLog(format!(
                "command {:?} spans multiple lines",
                command
            )));
        }

        if self.file.is_none() {
            let mut options = OpenOptions::new();
            options.create(true);
            if self.truncate_on_open {
                options.write(true).truncate(true);
            } else {
                options.append(true);
            }
            self.file = Some(options.open(&self.path)?);
            self.truncate_on_open = false;
        }
        let file = match self.file.as_mut() {
            Some(file) => file,
            None => return Err(NestError::CommandLog("log file handle unavailable".to_string())),
        };

        let mut line = String::with_capacity(command.len() + 1);
        line.push_str(command);
        line.push('\n');
        file.write_all(line.as_bytes())?;
        file.flush()?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            file.sync_all()?;
        }

        self.appended += 1;
        tracing::debug!(command, "logged pending command");
        Ok(())
    }

    /// Delete the log file, returning whether one existed
    ///
    /// If the file survives (the delete failed), the next append starts it
    /// over rather than extending it.
    pub fn remove(&mut self) -> Result<bool> {
        self.file = None;
        self.appended = 0;
        self.truncate_on_open = true;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!("removed command log {}", self.path.display());
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether the log file is present on disk
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Lines appended since this writer was created or last removed the file
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// Get the log file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
