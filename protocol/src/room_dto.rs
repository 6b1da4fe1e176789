use crate::{GameType, PlayerId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Room lifecycle state (§4.2). No transition ever returns `Playing` to
/// `Waiting` — the only further transition is destruction (removal from the
/// registry), which is not itself a `RoomStatus` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Waiting,
    Playing,
}

/// The client-facing projection of a room (§6: "Room DTOs MUST include...").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomDto {
    pub code: String,
    pub host: PlayerId,
    pub players: Vec<PlayerId>,
    pub player_names: HashMap<PlayerId, String>,
    pub player_indices: HashMap<PlayerId, u32>,
    pub spectators: Vec<PlayerId>,
    pub game_type: GameType,
    pub game_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    pub status: RoomStatus,
    /// Wall-clock mirror of the room's internal `Instant`-based creation
    /// time, for client display (§3).
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RoomDto {
        let mut player_names = HashMap::new();
        player_names.insert("p1".to_string(), "Ann".to_string());
        let mut player_indices = HashMap::new();
        player_indices.insert("p1".to_string(), 1);
        RoomDto {
            code: "ABC123".into(),
            host: "p1".into(),
            players: vec!["p1".into()],
            player_names,
            player_indices,
            spectators: vec![],
            game_type: GameType::TicTacToe,
            game_mode: "classic".into(),
            game_id: None,
            status: RoomStatus::Waiting,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn omits_empty_game_id() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("game_id").is_none());
    }

    #[test]
    fn round_trips_through_json() {
        let dto = sample();
        let json = serde_json::to_string(&dto).unwrap();
        let back: RoomDto = serde_json::from_str(&json).unwrap();
        assert_eq!(back.code, dto.code);
        assert_eq!(back.host, dto.host);
    }
}
