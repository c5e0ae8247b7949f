//! Record definitions
//!
//! One line of the record log: `<flag>,<key>,<value>\n`.

use crate::error::{NestError, Result};

/// Field separator inside a record line
pub const SEPARATOR: char = ',';

/// A committed value and the offset of the record that holds it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    /// The stored integer value
    pub value: i64,

    /// Byte offset of the record's flag byte in the record log.
    /// Only valid until that byte is tombstoned.
    pub offset: u64,
}

/// The first byte of every record line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFlag {
    Live,
    Deleted,
}

impl RecordFlag {
    pub fn as_byte(self) -> u8 {
        match self {
            RecordFlag::Live => b'0',
            RecordFlag::Deleted => b'1',
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'0' => Some(RecordFlag::Live),
            b'1' => Some(RecordFlag::Deleted),
            _ => None,
        }
    }
}

/// A decoded record line, borrowing its key from the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord<'a> {
    pub flag: RecordFlag,
    pub key: &'a str,
    pub value: i64,
}

/// Encode a live record line, including the trailing newline
pub fn encode_record(key: &str, value: i64) -> String {
    format!(
        "{}{SEPARATOR}{key}{SEPARATOR}{value}\n",
        RecordFlag::Live.as_byte() as char
    )
}

/// Decode one record line (with or without its trailing newline)
///
/// Returns a description of the problem for lines that are not records.
pub fn parse_record(line: &str) -> std::result::Result<ParsedRecord<'_>, String> {
    let line = line.strip_suffix('\n').unwrap_or(line);
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut fields = line.splitn(3, SEPARATOR);
    let (flag, key, value) = match (fields.next(), fields.next(), fields.next()) {
        (Some(flag), Some(key), Some(value)) => (flag, key, value),
        _ => return Err(format!("expected 3 fields in {:?}", line)),
    };

    let flag = match flag.as_bytes() {
        [byte] => RecordFlag::from_byte(*byte)
            .ok_or_else(|| format!("unknown flag {:?}", flag))?,
        _ => return Err(format!("flag must be one byte, got {:?}", flag)),
    };

    if key.is_empty() {
        return Err("empty key".to_string());
    }

    let value = value
        .parse::<i64>()
        .map_err(|e| format!("bad value {:?}: {}", value, e))?;

    Ok(ParsedRecord { flag, key, value })
}

/// Keys must survive the record line format unchanged
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(NestError::MalformedCommand("key must not be empty".to_string()));
    }
    if key.contains(SEPARATOR) || key.chars().any(char::is_whitespace) {
        return Err(NestError::MalformedCommand(format!(
            "key {:?} must not contain ',' or whitespace",
            key
        )));
    }
    Ok(())
}
