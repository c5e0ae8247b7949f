//! Tests for the Command Log
//!
//! These tests verify:
//! - Lazy creation on first append
//! - Line-per-command format
//! - Removal and re-creation
//! - Reading back complete lines, skipping blanks and torn tails
//! - Detection of a leftover log

use std::fs;
use std::path::PathBuf;

use nestkv::config::SyncStrategy;
use nestkv::wal::{CommandLog, CommandLogReader, PendingRecovery};
use nestkv::NestError;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_log() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pending.log");
    (temp_dir, path)
}

// =============================================================================
// Writer Tests
// =============================================================================

#[test]
fn test_new_does_not_create_file() {
    let (_temp, path) = setup_temp_log();

    let log = CommandLog::new(&path, SyncStrategy::EveryWrite);

    assert!(!log.exists());
    assert!(!path.exists());
}

#[test]
fn test_append_writes_one_line_per_command() {
    let (_temp, path) = setup_temp_log();
    let mut log = CommandLog::new(&path, SyncStrategy::EveryWrite);

    log.append("BEGIN").unwrap();
    log.append("SET a 1").unwrap();

    assert!(log.exists());
    assert_eq!(log.appended(), 2);
    assert_eq!(fs::read_to_string(&path).unwrap(), "BEGIN\nSET a 1\n");
}

#[test]
fn test_append_rejects_multiline_command() {
    let (_temp, path) = setup_temp_log();
    let mut log = CommandLog::new(&path, SyncStrategy::EveryWrite);

    let err = log.append("SET a 1\nSET b 2").unwrap_err();

    assert!(matches!(err, NestError::CommandLog(_)));
    assert!(!path.exists());
}

#[test]
fn test_remove_and_recreate() {
    let (_temp, path) = setup_temp_log();
    let mut log = CommandLog::new(&path, SyncStrategy::EveryWrite);
    log.append("BEGIN").unwrap();

    assert!(log.remove().unwrap());
    assert!(!path.exists());
    assert!(!log.remove().unwrap());

    log.append("BEGIN").unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "BEGIN\n");
}

#[test]
fn test_append_extends_existing_file() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "BEGIN\n").unwrap();

    let mut log = CommandLog::new(&path, SyncStrategy::OsBuffered);
    log.append("SET a 1").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "BEGIN\nSET a 1\n");
}

#[test]
fn test_append_after_remove_starts_over() {
    let (_temp, path) = setup_temp_log();
    let mut log = CommandLog::new(&path, SyncStrategy::EveryWrite);
    log.append("BEGIN").unwrap();
    log.append("SET a 1").unwrap();
    log.remove().unwrap();

    // A finished log that is still on disk must not be extended
    fs::write(&path, "BEGIN\nSET a 1\nCOMMIT\n").unwrap();
    log.append("BEGIN").unwrap();
    log.append("SET b 2").unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "BEGIN\nSET b 2\n");
    assert_eq!(log.appended(), 2);
}

// =============================================================================
// Reader Tests
// =============================================================================

#[test]
fn test_reader_returns_commands_in_order() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "BEGIN\nSET a 1\nCOMMIT\n").unwrap();

    let commands = CommandLogReader::read_all(&path).unwrap();

    assert_eq!(commands, vec!["BEGIN", "SET a 1", "COMMIT"]);
}

#[test]
fn test_reader_skips_blank_lines_and_torn_tail() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "BEGIN\n\n  \nSET a 1\nSET b").unwrap();

    let mut reader = CommandLogReader::open(&path).unwrap();

    assert_eq!(reader.next_command().unwrap().as_deref(), Some("BEGIN"));
    assert_eq!(reader.next_command().unwrap().as_deref(), Some("SET a 1"));
    assert_eq!(reader.line_no(), 4);
    assert_eq!(reader.next_command().unwrap(), None);
}

#[test]
fn test_reader_skips_non_utf8_lines() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, b"BEGIN\n\xff\xfe\nSET a 1\n").unwrap();

    let mut reader = CommandLogReader::open(&path).unwrap();

    assert_eq!(reader.next_command().unwrap().as_deref(), Some("BEGIN"));
    assert_eq!(reader.next_command().unwrap().as_deref(), Some("SET a 1"));
    assert_eq!(reader.next_command().unwrap(), None);
    assert_eq!(reader.damaged(), 1);
}

// =============================================================================
// Recovery Detection Tests
// =============================================================================

#[test]
fn test_detect_absent_log() {
    let (_temp, path) = setup_temp_log();

    assert_eq!(PendingRecovery::detect(&path).unwrap(), None);
}

#[test]
fn test_detect_leftover_log() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "BEGIN\nSET a 1\n").unwrap();

    let pending = PendingRecovery::detect(&path).unwrap().unwrap();

    assert_eq!(pending.path, path);
    assert_eq!(pending.len(), 2);
    assert_eq!(pending.commands, vec!["BEGIN", "SET a 1"]);
    assert_eq!(pending.damaged, 0);
}

#[test]
fn test_detect_counts_damaged_lines() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, b"BEGIN\nSET a \xff\nSET b 2\n").unwrap();

    let pending = PendingRecovery::detect(&path).unwrap().unwrap();

    assert_eq!(pending.commands, vec!["BEGIN", "SET b 2"]);
    assert_eq!(pending.damaged, 1);
}

#[test]
fn test_detect_empty_leftover_log() {
    let (_temp, path) = setup_temp_log();
    fs::write(&path, "").unwrap();

    let pending = PendingRecovery::detect(&path).unwrap().unwrap();

    assert!(pending.is_empty());
}
