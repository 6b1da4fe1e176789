use crate::{PlayerId, RoomDto};
use serde::Serialize;
use serde_json::Value;

/// The closed set of outbound message types (§4.3). Every server->client
/// frame is one of these, serialized once per message by the broadcaster
/// and pushed verbatim to however many recipients are targeted.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum OutboundMessage {
    RoomState {
        room: Option<RoomDto>,
    },
    GameState {
        game: Value,
    },
    PlayerJoined {
        player_id: PlayerId,
        player_name: String,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    ChatMessage {
        player_id: PlayerId,
        text: String,
        sent_at: String,
    },
    Error {
        message: String,
    },
    Timeout {
        reason: String,
    },
    GameOver {
        winner: String,
    },
    QuickMatch {
        status: String,
    },
    QuickMatchFound {
        code: String,
    },
    Leaderboard {
        entries: Vec<LeaderboardEntryDto>,
    },
}

/// A single row of the top-10 Jeopardy-correct-value leaderboard (§6).
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntryDto {
    pub player_id: PlayerId,
    pub player_name: String,
    pub score: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_serializes_under_payload() {
        let msg = OutboundMessage::Error {
            message: "room is full".into(),
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["payload"]["message"], "room is full");
    }

    #[test]
    fn room_state_with_null_room_round_trips() {
        let msg = OutboundMessage::RoomState { room: None };
        let value = serde_json::to_value(&msg).unwrap();
        assert!(value["payload"]["room"].is_null());
    }
}
