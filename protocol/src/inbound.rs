use crate::{GameType, PlayerId};
use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

/// The closed set of inbound command types (§6). Decoding rejects unknown
/// `type` tags and unknown fields are simply ignored by `serde_json`'s
/// default behavior — extra fields from a chatty client are not a protocol
/// violation, a missing required field or an unknown `type` is.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum InboundMessage {
    CreateRoom {
        game_type: GameType,
        player_id: PlayerId,
        player_name: String,
        #[serde(default)]
        game_mode: Option<String>,
        #[serde(default)]
        password: Option<String>,
    },
    JoinRoom {
        code: String,
        player_id: PlayerId,
        player_name: String,
        #[serde(default)]
        password: Option<String>,
    },
    LeaveRoom {
        code: String,
        player_id: PlayerId,
    },
    StartGame {
        code: String,
        player_id: PlayerId,
    },
    /// `game_id`, `player_id`, plus whatever fields the target engine's move
    /// payload needs (§4.4-2); those extra fields are captured unparsed and
    /// handed to the engine as a `serde_json::Value`.
    MakeMove {
        game_id: String,
        player_id: PlayerId,
        #[serde(flatten)]
        fields: Map<String, Value>,
    },
    /// Routed to the Jeopardy engine specifically (§6).
    Answer {
        game_id: String,
        player_id: PlayerId,
        answer: String,
    },
    ChatMessage {
        room_code: String,
        player_id: PlayerId,
        text: String,
    },
    QuickMatch {
        player_id: PlayerId,
        game_type: GameType,
    },
    Leaderboard {},
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_create_room() {
        let raw = r#"{"type":"create_room","payload":{"game_type":"tic_tac_toe","player_id":"p1","player_name":"Ann"}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        match msg {
            InboundMessage::CreateRoom {
                player_name,
                game_mode,
                ..
            } => {
                assert_eq!(player_name, "Ann");
                assert_eq!(game_mode, None);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn decodes_make_move_with_engine_specific_fields() {
        let raw = r#"{"type":"make_move","payload":{"game_id":"game_abc12345","player_id":"p1","column":3}}"#;
        let msg: InboundMessage = serde_json::from_str(raw).unwrap();
        match msg {
            InboundMessage::MakeMove { fields, .. } => {
                assert_eq!(fields.get("column").unwrap(), 3);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_type() {
        let raw = r#"{"type":"teleport","payload":{}}"#;
        let result: Result<InboundMessage, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        let raw = "not json";
        let result: Result<InboundMessage, _> = serde_json::from_str(raw);
        assert!(result.is_err());
    }
}
