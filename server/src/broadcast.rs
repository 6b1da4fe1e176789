//! Fan-out helpers for pushing an [`OutboundMessage`] to one session or to
//! every session in a room (§4.3). A dropped/closed channel only means the
//! peer's writer task already hung up; it is logged, never an error worth
//! propagating.

use protocol::OutboundMessage;
use tokio::sync::mpsc;

use crate::room::Room;
use crate::state::AppState;

pub async fn send_to(tx: &mpsc::UnboundedSender<OutboundMessage>, msg: OutboundMessage) {
    if tx.send(msg).is_err() {
        tracing::warn!("dropped outbound message: session channel closed");
    }
}

/// Non-blocking per §5: an `UnboundedSender` never suspends, so this may be
/// (and is) called while the caller is still holding the room lock.
pub async fn broadcast_room(room: &Room, msg: OutboundMessage) {
    for tx in room.sessions.values() {
        if tx.send(msg.clone()).is_err() {
            tracing::warn!("dropped broadcast message: session channel closed");
        }
    }
}

pub async fn broadcast_room_state(room: &Room) {
    broadcast_room(room, OutboundMessage::RoomState { room: Some(room.to_dto()) }).await;
}

/// Process-wide fan-out to every session in every room (§4.3), e.g. an
/// operator-issued server announcement. Each room is locked in turn rather
/// than all at once; a send is still non-blocking per §5, so this never
/// holds more than one room lock at a time.
pub async fn broadcast_all(state: &AppState, msg: OutboundMessage) {
    let rooms: Vec<_> = state.rooms.lock().await.values().cloned().collect();
    for room_lock in rooms {
        let room = room_lock.lock().await;
        broadcast_room(&room, msg.clone()).await;
    }
}

pub async fn broadcast_game_state(room: &Room) {
    if let Some(engine) = &room.engine {
        broadcast_room(room, OutboundMessage::GameState { game: engine.snapshot() }).await;
        if engine.is_over() {
            if let Some(winner) = engine.winner() {
                broadcast_room(room, OutboundMessage::GameOver { winner }).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::GameType;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[tokio::test]
    async fn broadcast_all_reaches_sessions_in_every_room() {
        let state = AppState::default();

        let mut room_a = Room::new("AAA111".to_string(), "p1".to_string(), GameType::TicTacToe, "classic".to_string(), None);
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        room_a.players.push("p1".to_string());
        room_a.sessions.insert("p1".to_string(), tx_a);

        let mut room_b = Room::new("BBB222".to_string(), "p2".to_string(), GameType::TicTacToe, "classic".to_string(), None);
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        room_b.players.push("p2".to_string());
        room_b.sessions.insert("p2".to_string(), tx_b);

        state.rooms.lock().await.insert("AAA111".to_string(), Arc::new(Mutex::new(room_a)));
        state.rooms.lock().await.insert("BBB222".to_string(), Arc::new(Mutex::new(room_b)));

        broadcast_all(&state, OutboundMessage::Timeout { reason: "server restarting".to_string() }).await;

        assert!(matches!(rx_a.try_recv(), Ok(OutboundMessage::Timeout { .. })));
        assert!(matches!(rx_b.try_recv(), Ok(OutboundMessage::Timeout { .. })));
    }
}
