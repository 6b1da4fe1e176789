//! Small shared helpers used across every engine module.

use protocol::ErrorKind;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Parses a move's JSON payload into a typed struct, mapping any shape
/// mismatch to `ErrorKind::ValidationFailed` rather than panicking (§9
/// redesign note: a typed command variant per inbound type, reject unknown
/// fields/types with `ValidationFailed`).
pub fn parse_move<T: DeserializeOwned>(fields: Map<String, Value>) -> Result<T, ErrorKind> {
    serde_json::from_value(Value::Object(fields))
        .map_err(|e| ErrorKind::ValidationFailed(format!("malformed move payload: {e}")))
}

/// Finds a player's 0-based seat index, the basis for turn-order checks.
pub fn seat_of(players: &[String], player_id: &str) -> Option<usize> {
    players.iter().position(|p| p == player_id)
}
