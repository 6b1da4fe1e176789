//! Wire protocol for the game room server.
//!
//! This crate defines every type that crosses the `/ws` boundary: the closed
//! set of inbound command types (§6 of the design spec), the closed set of
//! outbound message types, the room DTO shape, and the error-kind taxonomy
//! used to report rejected commands back to the originating session.
//!
//! Frames are length-delimited by the websocket transport itself; the
//! payload is always `{"type": <string>, "payload": <object>}`.

mod error;
mod game_type;
mod inbound;
mod outbound;
mod room_dto;

pub use error::ErrorKind;
pub use game_type::GameType;
pub use inbound::InboundMessage;
pub use outbound::OutboundMessage;
pub use room_dto::RoomDto;

/// A player's self-chosen identity token. Opaque to the server; uniqueness
/// within a room is enforced, uniqueness across the whole process is not.
pub type PlayerId = String;

/// A 6-character, uppercase-alphanumeric room code, process-unique.
pub type RoomCode = String;

/// Maximum printable-character length of a display name (§3).
pub const MAX_PLAYER_NAME_LEN: usize = 20;

/// Maximum players allowed in a single room (§3).
pub const MAX_PLAYERS: usize = 8;

/// Consecutive malformed frames that terminate a session (§4.1).
pub const MAX_MALFORMED_FRAMES: u32 = 3;

/// Idle threshold after which the janitor evicts a room (§4.2).
pub const ROOM_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Interval at which the janitor sweeps the registry (§4.2).
pub const JANITOR_INTERVAL_SECS: u64 = 60;

/// Game types for which a mid-game player join is allowed (§3 Glossary:
/// Multi-player-joinable).
pub fn is_multi_player_joinable(game_type: GameType) -> bool {
    matches!(
        game_type,
        GameType::Uno | GameType::Mafia | GameType::Trivia | GameType::Memory
    )
}

/// Parses and normalizes a room code: uppercases it and checks the 6-char
/// alphanumeric shape. Returns `None` for anything else (caller maps this to
/// `ErrorKind::ValidationFailed`).
pub fn normalize_room_code(raw: &str) -> Option<RoomCode> {
    let upper = raw.to_ascii_uppercase();
    if upper.len() == 6 && upper.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(upper)
    } else {
        None
    }
}

/// Trims and validates a player display name per §4.2 (required, ≤20
/// printable characters once trimmed).
pub fn validate_player_name(raw: &str) -> Result<String, ErrorKind> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_PLAYER_NAME_LEN {
        return Err(ErrorKind::ValidationFailed(
            "player_name must be 1-20 printable characters".into(),
        ));
    }
    Ok(trimmed.to_string())
}
