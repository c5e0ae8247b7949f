//! Protocol Codec Tests
//!
//! Tests verify:
//! - Decoding of every command form
//! - Case-insensitive verbs and flags
//! - InvalidValue vs MalformedCommand rejections
//! - Canonical encoding (the command log format)
//! - Response rendering

use nestkv::protocol::{decode_command, encode_command, parse_value, Command, CommandType, Response};
use nestkv::NestError;

// =============================================================================
// Decode Tests
// =============================================================================

#[test]
fn test_decode_set() {
    let command = decode_command("SET a 10").unwrap();
    assert_eq!(command, Command::Set { key: "a".into(), value: 10 });
    assert_eq!(command.command_type(), CommandType::Set);
    assert!(command.is_mutating());
}

#[test]
fn test_decode_is_case_insensitive_for_verbs() {
    assert_eq!(
        decode_command("set a -5").unwrap(),
        Command::Set { key: "a".into(), value: -5 }
    );
    assert_eq!(decode_command("begin").unwrap(), Command::Begin);
    assert_eq!(decode_command("Commit all").unwrap(), Command::Commit { all: true });
    assert_eq!(
        decode_command("get a pending").unwrap(),
        Command::Get { key: "a".into(), pending: true }
    );
}

#[test]
fn test_decode_keys_are_case_sensitive() {
    assert_eq!(
        decode_command("GET Key").unwrap(),
        Command::Get { key: "Key".into(), pending: false }
    );
}

#[test]
fn test_decode_tolerates_extra_whitespace() {
    assert_eq!(
        decode_command("  UNSET   a  \n").unwrap(),
        Command::Unset { key: "a".into() }
    );
}

#[test]
fn test_decode_remaining_commands() {
    assert_eq!(decode_command("NUMEQUALTO 3").unwrap(), Command::NumEqualTo { value: 3 });
    assert_eq!(decode_command("ROLLBACK").unwrap(), Command::Rollback);
    assert_eq!(decode_command("COMMIT").unwrap(), Command::Commit { all: false });

    let read = decode_command("GET a").unwrap();
    assert!(!read.is_mutating());
}

#[test]
fn test_decode_non_integer_value() {
    let err = decode_command("SET a ten").unwrap_err();
    assert!(matches!(err, NestError::InvalidValue(ref v) if v == "ten"));

    let err = decode_command("NUMEQUALTO 1.5").unwrap_err();
    assert!(matches!(err, NestError::InvalidValue(_)));
}

#[test]
fn test_decode_wrong_argument_counts() {
    for line in [
        "SET a",
        "SET a 1 2",
        "UNSET",
        "UNSET a b",
        "GET",
        "GET a b c",
        "NUMEQUALTO",
        "BEGIN now",
        "ROLLBACK all",
        "COMMIT everything",
    ] {
        let err = decode_command(line).unwrap_err();
        assert!(
            matches!(err, NestError::MalformedCommand(_)),
            "{:?} should be malformed, got {:?}",
            line,
            err
        );
    }
}

#[test]
fn test_decode_get_with_unknown_flag() {
    let err = decode_command("GET a LATER").unwrap_err();
    assert!(matches!(err, NestError::MalformedCommand(_)));
}

#[test]
fn test_decode_unknown_and_empty() {
    assert!(matches!(decode_command("FROB a").unwrap_err(), NestError::MalformedCommand(_)));
    assert!(matches!(decode_command("   ").unwrap_err(), NestError::MalformedCommand(_)));
}

#[test]
fn test_decode_rejects_key_with_separator() {
    let err = decode_command("SET a,b 1").unwrap_err();
    assert!(matches!(err, NestError::MalformedCommand(_)));
}

#[test]
fn test_argument_count_is_checked_before_value() {
    // Too many arguments wins over a bad value
    let err = decode_command("SET a x y").unwrap_err();
    assert!(matches!(err, NestError::MalformedCommand(_)));
}

#[test]
fn test_parse_value() {
    assert_eq!(parse_value("42").unwrap(), 42);
    assert_eq!(parse_value("-7").unwrap(), -7);
    assert!(parse_value("").is_err());
    assert!(parse_value("99999999999999999999").is_err());
}

// =============================================================================
// Encode Tests
// =============================================================================

#[test]
fn test_encode_canonical_forms() {
    assert_eq!(encode_command(&Command::Set { key: "a".into(), value: 1 }), "SET a 1");
    assert_eq!(encode_command(&Command::Unset { key: "a".into() }), "UNSET a");
    assert_eq!(
        encode_command(&Command::Get { key: "a".into(), pending: true }),
        "GET a PENDING"
    );
    assert_eq!(encode_command(&Command::NumEqualTo { value: -2 }), "NUMEQUALTO -2");
    assert_eq!(encode_command(&Command::Begin), "BEGIN");
    assert_eq!(encode_command(&Command::Commit { all: false }), "COMMIT");
    assert_eq!(encode_command(&Command::Commit { all: true }), "COMMIT ALL");
    assert_eq!(encode_command(&Command::Rollback), "ROLLBACK");
}

#[test]
fn test_encode_normalizes_user_input() {
    let command = decode_command("  set   Key   007 ").unwrap();
    assert_eq!(encode_command(&command), "SET Key 7");
}

// =============================================================================
// Response Tests
// =============================================================================

#[test]
fn test_response_display() {
    assert_eq!(Response::Value(10).to_string(), "10");
    assert_eq!(Response::Null.to_string(), "NULL");
    assert_eq!(Response::Pending(-1).to_string(), "-1");
    assert_eq!(Response::PendingUnset.to_string(), "NULL (pending unset)");
    assert_eq!(Response::NothingPending.to_string(), "Nothing pending");
    assert_eq!(Response::Count(3).to_string(), "3");
    assert!(Response::Ok.is_silent());
    assert!(!Response::Null.is_silent());
}
