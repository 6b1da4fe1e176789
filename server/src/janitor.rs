//! Periodic sweep that evicts rooms nobody has touched in a while. Grounded
//! on the teacher's `cleanup_dead_rooms` watchdog in `main.rs`, generalized
//! from "socket closed" liveness to idle-duration liveness (§4.2): a room's
//! sockets can still be open while the room itself has gone stale (every
//! member chatting in some other room's tab, say), so eviction here is a
//! soft reset of room membership rather than a hard disconnect of anyone.

use std::sync::Arc;
use std::time::{Duration, Instant};

use protocol::{OutboundMessage, ROOM_IDLE_TIMEOUT_SECS};

use crate::broadcast::broadcast_room;
use crate::state::AppState;

pub async fn run(state: Arc<AppState>, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        interval.tick().await;
        sweep(&state).await;
    }
}

async fn sweep(state: &Arc<AppState>) {
    let idle_limit = Duration::from_secs(ROOM_IDLE_TIMEOUT_SECS);
    let now = Instant::now();

    let stale: Vec<_> = {
        let rooms = state.rooms.lock().await;
        let mut stale = Vec::new();
        for (code, room_lock) in rooms.iter() {
            if let Ok(room) = room_lock.try_lock() {
                if now.duration_since(room.last_active) >= idle_limit {
                    stale.push((code.clone(), room_lock.clone()));
                }
            }
        }
        stale
    };

    for (code, room_lock) in stale {
        let room = room_lock.lock().await;
        tracing::info!(room_code = %code, "evicting idle room");
        broadcast_room(&room, OutboundMessage::RoomState { room: None }).await;
        drop(room);

        state.rooms.lock().await.remove(&code);
        state.timers.cancel_all_for_room(&code).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::Room;
    use protocol::GameType;
    use tokio::sync::{mpsc, Mutex};

    #[tokio::test]
    async fn sweep_evicts_idle_rooms_and_notifies_their_sessions() {
        let state = Arc::new(AppState::default());
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut room = Room::new("IDLE01".to_string(), "p1".to_string(), GameType::TicTacToe, "classic".to_string(), None);
        room.players.push("p1".to_string());
        room.sessions.insert("p1".to_string(), tx);
        room.last_active = Instant::now() - Duration::from_secs(ROOM_IDLE_TIMEOUT_SECS + 1);
        state.rooms.lock().await.insert("IDLE01".to_string(), Arc::new(Mutex::new(room)));

        sweep(&state).await;

        assert!(state.rooms.lock().await.get("IDLE01").is_none());
        let notification = rx.try_recv().expect("evicted session should be notified");
        assert!(matches!(notification, OutboundMessage::RoomState { room: None }));
    }

    #[tokio::test]
    async fn sweep_leaves_active_rooms_alone() {
        let state = Arc::new(AppState::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let mut room = Room::new("FRESH1".to_string(), "p1".to_string(), GameType::TicTacToe, "classic".to_string(), None);
        room.sessions.insert("p1".to_string(), tx);
        state.rooms.lock().await.insert("FRESH1".to_string(), Arc::new(Mutex::new(room)));

        sweep(&state).await;

        assert!(state.rooms.lock().await.get("FRESH1").is_some());
    }
}
