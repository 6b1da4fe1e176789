//! A single game room: its membership, its engine (once started), and the
//! per-player outbound channels used to reach every connected session.

use chrono::{DateTime, Utc};
use engines::Engine;
use protocol::{GameType, OutboundMessage, PlayerId, RoomCode, RoomDto, RoomStatus};
use std::collections::HashMap;
use std::time::Instant;
use tokio::sync::mpsc;

pub struct Room {
    pub code: RoomCode,
    pub host: PlayerId,
    pub players: Vec<PlayerId>,
    pub spectators: Vec<PlayerId>,
    pub player_names: HashMap<PlayerId, String>,
    pub sessions: HashMap<PlayerId, mpsc::UnboundedSender<OutboundMessage>>,
    pub game_type: GameType,
    pub game_mode: String,
    pub password: Option<String>,
    pub status: RoomStatus,
    pub game_id: Option<String>,
    pub engine: Option<Engine>,
    /// Bumped every time the engine is (re)created; scheduled timers carry
    /// the epoch they were set under so a stale callback from a prior game
    /// in this room is a no-op (§9 redesign note).
    pub epoch: u64,
    pub created_at: Instant,
    /// Wall-clock mirror of `created_at`, carried solely so `to_dto` can
    /// expose a `chrono::DateTime<Utc>` to clients — the monotonic `Instant`
    /// above is what every internal duration comparison actually uses.
    pub created_at_wall: DateTime<Utc>,
    pub last_active: Instant,
}

impl Room {
    pub fn new(code: RoomCode, host: PlayerId, game_type: GameType, game_mode: String, password: Option<String>) -> Self {
        let now = Instant::now();
        Room {
            code,
            host,
            players: Vec::new(),
            spectators: Vec::new(),
            player_names: HashMap::new(),
            sessions: HashMap::new(),
            game_type,
            game_mode,
            password,
            status: RoomStatus::Waiting,
            game_id: None,
            engine: None,
            epoch: 0,
            created_at: now,
            created_at_wall: Utc::now(),
            last_active: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn to_dto(&self) -> RoomDto {
        let player_indices = self.players.iter().enumerate().map(|(i, p)| (p.clone(), i as u32)).collect();
        RoomDto {
            code: self.code.clone(),
            host: self.host.clone(),
            players: self.players.clone(),
            player_names: self.player_names.clone(),
            player_indices,
            spectators: self.spectators.clone(),
            game_type: self.game_type,
            game_mode: self.game_mode.clone(),
            game_id: self.game_id.clone(),
            status: self.status,
            created_at: self.created_at_wall,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
