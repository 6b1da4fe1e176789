//! Global server state: the room registry, the quick-match queues and the
//! leaderboard. Grounded on the teacher's `AppState` (registry-level lock
//! guarding a `HashMap`), generalized to a registry lock plus a per-room
//! lock so room mutation never blocks unrelated rooms (§5).

use protocol::{GameType, OutboundMessage, PlayerId, RoomCode};
use rand::seq::IndexedRandom;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::room::Room;
use crate::timer_registry::TimerRegistry;

const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const ROOM_CODE_LEN: usize = 6;

pub struct QuickMatchEntry {
    pub player_id: PlayerId,
    pub player_name: String,
    pub tx: mpsc::UnboundedSender<OutboundMessage>,
}

#[derive(Clone)]
pub struct LeaderboardEntry {
    pub player_name: String,
    pub score: u64,
}

#[derive(Default)]
pub struct AppState {
    pub rooms: Mutex<HashMap<RoomCode, Arc<Mutex<Room>>>>,
    pub quick_match: Mutex<HashMap<GameType, Vec<QuickMatchEntry>>>,
    pub leaderboard: Mutex<HashMap<PlayerId, LeaderboardEntry>>,
    pub timers: TimerRegistry,
}

impl AppState {
    pub async fn fresh_room_code(&self) -> RoomCode {
        let rooms = self.rooms.lock().await;
        loop {
            let code = random_code();
            if !rooms.contains_key(&code) {
                return code;
            }
        }
    }

    pub async fn record_score(&self, player_id: &str, player_name: &str, points: u64) {
        if points == 0 {
            return;
        }
        let mut board = self.leaderboard.lock().await;
        let entry = board.entry(player_id.to_string()).or_insert(LeaderboardEntry {
            player_name: player_name.to_string(),
            score: 0,
        });
        entry.score += points;
        entry.player_name = player_name.to_string();
    }

    pub async fn top_leaderboard(&self, n: usize) -> Vec<(PlayerId, LeaderboardEntry)> {
        let board = self.leaderboard.lock().await;
        let mut entries: Vec<_> = board.iter().map(|(id, e)| (id.clone(), e.clone())).collect();
        entries.sort_by(|a, b| b.1.score.cmp(&a.1.score));
        entries.truncate(n);
        entries
    }
}

fn random_code() -> RoomCode {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LEN)
        .map(|_| *ROOM_CODE_ALPHABET.choose(&mut rng).expect("alphabet is non-empty") as char)
        .collect()
}
