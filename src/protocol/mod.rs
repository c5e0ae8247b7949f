//! Protocol Module
//!
//! The line-oriented command interface between the engine and whatever
//! drives it (the REPL, tests, command log replay).
//!
//! ## Command Grammar
//! Tokens are separated by whitespace; verbs are case-insensitive.
//! ```text
//! SET <key> <int>        UNSET <key>
//! GET <key> [PENDING]    NUMEQUALTO <int>
//! BEGIN                  ROLLBACK
//! COMMIT [ALL]
//! ```
//!
//! ## Responses
//! - mutations: nothing to print
//! - `GET`: the value, or `NULL`
//! - `GET … PENDING`: the pending value, `NULL (pending unset)`, or `Nothing pending`
//! - `NUMEQUALTO`: a count

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::Response;
pub use codec::{decode_command, encode_command, parse_value};
