//! Protocol codec
//!
//! Decoding of command lines and encoding of their canonical form, which is
//! also the text written to the command log.

use crate::error::{NestError, Result};
use crate::storage::validate_key;

use super::Command;

// =============================================================================
// Decoding
// =============================================================================

/// Decode one command line
///
/// Every argument is validated here, so a command that decodes cleanly can
/// only be rejected later for state reasons (e.g. no open transaction).
pub fn decode_command(line: &str) -> Result<Command> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let (verb, args) = match tokens.split_first() {
        Some((verb, args)) => (verb.to_ascii_uppercase(), args),
        None => return Err(NestError::MalformedCommand("empty command".to_string())),
    };

    match verb.as_str() {
        "SET" => match args {
            [key, value] => {
                validate_key(key)?;
                Ok(Command::Set {
                    key: key.to_string(),
                    value: parse_value(value)?,
                })
            }
            _ => Err(usage("SET {key} {value}")),
        },
        "UNSET" => match args {
            [key] => {
                validate_key(key)?;
                Ok(Command::Unset { key: key.to_string() })
            }
            _ => Err(usage("UNSET {key}")),
        },
        "GET" => match args {
            [key] => {
                validate_key(key)?;
                Ok(Command::Get { key: key.to_string(), pending: false })
            }
            [key, flag] if flag.eq_ignore_ascii_case("PENDING") => {
                validate_key(key)?;
                Ok(Command::Get { key: key.to_string(), pending: true })
            }
            _ => Err(usage("GET {key} [PENDING]")),
        },
        "NUMEQUALTO" => match args {
            [value] => Ok(Command::NumEqualTo { value: parse_value(value)? }),
            _ => Err(usage("NUMEQUALTO {value}")),
        },
        "BEGIN" => match args {
            [] => Ok(Command::Begin),
            _ => Err(usage("BEGIN")),
        },
        "ROLLBACK" => match args {
            [] => Ok(Command::Rollback),
            _ => Err(usage("ROLLBACK")),
        },
        "COMMIT" => match args {
            [] => Ok(Command::Commit { all: false }),
            [all] if all.eq_ignore_ascii_case("ALL") => Ok(Command::Commit { all: true }),
            _ => Err(usage("COMMIT [ALL]")),
        },
        other => Err(NestError::MalformedCommand(format!("unknown command `{}`", other))),
    }
}

/// Parse an integer argument
pub fn parse_value(token: &str) -> Result<i64> {
    token
        .parse::<i64>()
        .map_err(|_| NestError::InvalidValue(token.to_string()))
}

fn usage(form: &str) -> NestError {
    NestError::MalformedCommand(format!("Usage: `{}`", form))
}

// =============================================================================
// Encoding
// =============================================================================

/// Canonical single-line text for a command
pub fn encode_command(command: &Command) -> String {
    let verb = command.command_type().keyword();
    match command {
        Command::Set { key, value } => format!("{verb} {key} {value}"),
        Command::Unset { key } => format!("{verb} {key}"),
        Command::Get { key, pending: false } => format!("{verb} {key}"),
        Command::Get { key, pending: true } => format!("{verb} {key} PENDING"),
        Command::NumEqualTo { value } => format!("{verb} {value}"),
        Command::Commit { all: true } => format!("{verb} ALL"),
        Command::Begin | Command::Rollback | Command::Commit { all: false } => verb.to_string(),
    }
}
