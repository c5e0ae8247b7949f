//! Command Log Reader
//!
//! Handles reading command lines back from the command log.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

/// Reads complete command lines from the command log, in order
pub struct CommandLogReader {
    reader: BufReader<File>,

    /// 1-based number of the last line read
    line_no: u64,

    /// Complete lines skipped because they are not UTF-8
    damaged: u64,
}

impl CommandLogReader {
    /// Open a command log for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            line_no: 0,
            damaged: 0,
        })
    }

    /// Read the next non-blank command
    ///
    /// Returns `Ok(None)` at end of file. A final line without a newline
    /// was never fully written and is skipped. Lines that are not UTF-8 are
    /// skipped and counted in [`CommandLogReader::damaged`].
    pub fn next_command(&mut self) -> Result<Option<String>> {
        let mut line = Vec::new();
        loop {
            line.clear();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            if line.last() != Some(&b'\n') {
                tracing::warn!(line = self.line_no, "ignoring torn command at end of log");
                return Ok(None);
            }

            let text = match std::str::from_utf8(&line) {
                Ok(text) => text.trim(),
                Err(e) => {
                    tracing::warn!(line = self.line_no, error = %e, "skipping damaged command");
                    self.damaged += 1;
                    continue;
                }
            };
            if !text.is_empty() {
                return Ok(Some(text.to_string()));
            }
        }
    }

    /// Read every complete command in the log at `path`
    pub fn read_all(path: &Path) -> Result<Vec<String>> {
        let mut reader = Self::open(path)?;
        let mut commands = Vec::new();
        while let Some(command) = reader.next_command()? {
            commands.push(command);
        }
        Ok(commands)
    }

    /// Number of lines consumed so far
    pub fn line_no(&self) -> u64 {
        self.line_no
    }

    /// Number of complete lines skipped as undecodable
    pub fn damaged(&self) -> u64 {
        self.damaged
    }
}
