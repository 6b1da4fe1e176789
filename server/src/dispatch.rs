//! Translates a decoded [`InboundMessage`] into room-registry mutation plus
//! the outbound traffic it provokes (§4.2, §6). One function per message
//! type, mirroring the teacher's one-handler-per-command shape in
//! `processing_module`.

use std::sync::Arc;

use engines::Engine;
use protocol::{
    is_multi_player_joinable, normalize_room_code, validate_player_name, ErrorKind, GameType,
    InboundMessage, OutboundMessage, PlayerId, RoomCode, MAX_PLAYERS,
};
use serde_json::Map;
use tokio::sync::mpsc;

use crate::broadcast::{broadcast_game_state, broadcast_room, broadcast_room_state, send_to};
use crate::room::Room;
use crate::state::{AppState, QuickMatchEntry};

/// What a session is currently bound to: which room, and which player_id it
/// authenticated as within it. A connection is a member of at most one room
/// at a time.
#[derive(Default)]
pub struct Membership {
    pub room_code: Option<RoomCode>,
    pub player_id: Option<PlayerId>,
}

pub async fn handle(
    state: &Arc<AppState>,
    membership: &mut Membership,
    player_tx: &mpsc::UnboundedSender<OutboundMessage>,
    msg: InboundMessage,
) {
    match msg {
        InboundMessage::CreateRoom { game_type, player_id, player_name, game_mode, password } => {
            handle_create_room(state, membership, player_tx, game_type, player_id, player_name, game_mode, password).await;
        }
        InboundMessage::JoinRoom { code, player_id, player_name, password } => {
            handle_join_room(state, membership, player_tx, code, player_id, player_name, password).await;
        }
        InboundMessage::LeaveRoom { code, player_id } => {
            handle_leave_room(state, membership, code, player_id).await;
        }
        InboundMessage::StartGame { code, player_id } => {
            handle_start_game(state, player_tx, code, player_id).await;
        }
        InboundMessage::MakeMove { game_id, player_id, fields } => {
            handle_make_move(state, player_tx, game_id, player_id, fields).await;
        }
        InboundMessage::Answer { game_id, player_id, answer } => {
            let mut fields = Map::new();
            fields.insert("answer".to_string(), serde_json::Value::String(answer));
            handle_make_move(state, player_tx, game_id, player_id, fields).await;
        }
        InboundMessage::ChatMessage { room_code, player_id, text } => {
            handle_chat_message(state, player_tx, room_code, player_id, text).await;
        }
        InboundMessage::QuickMatch { player_id, game_type } => {
            handle_quick_match(state, player_tx, player_id, game_type).await;
        }
        InboundMessage::Leaderboard {} => {
            handle_leaderboard(state, player_tx).await;
        }
    }
}

async fn reject(player_tx: &mpsc::UnboundedSender<OutboundMessage>, err: ErrorKind) {
    send_to(player_tx, OutboundMessage::Error { message: err.message() }).await;
}

#[allow(clippy::too_many_arguments)]
async fn handle_create_room(
    state: &Arc<AppState>,
    membership: &mut Membership,
    player_tx: &mpsc::UnboundedSender<OutboundMessage>,
    game_type: GameType,
    player_id: PlayerId,
    player_name: String,
    game_mode: Option<String>,
    password: Option<String>,
) {
    let player_name = match validate_player_name(&player_name) {
        Ok(n) => n,
        Err(e) => return reject(player_tx, e).await,
    };

    let code = state.fresh_room_code().await;
    let mut room = Room::new(code.clone(), player_id.clone(), game_type, game_mode.unwrap_or_else(|| "classic".to_string()), password);
    room.players.push(player_id.clone());
    room.player_names.insert(player_id.clone(), player_name);
    room.sessions.insert(player_id.clone(), player_tx.clone());

    broadcast_room_state(&room).await;
    state.rooms.lock().await.insert(code.clone(), Arc::new(tokio::sync::Mutex::new(room)));

    membership.room_code = Some(code);
    membership.player_id = Some(player_id);
}

async fn find_room(state: &Arc<AppState>, code: &str) -> Option<Arc<tokio::sync::Mutex<Room>>> {
    state.rooms.lock().await.get(code).cloned()
}

async fn handle_join_room(
    state: &Arc<AppState>,
    membership: &mut Membership,
    player_tx: &mpsc::UnboundedSender<OutboundMessage>,
    code: String,
    player_id: PlayerId,
    player_name: String,
    password: Option<String>,
) {
    let Some(code) = normalize_room_code(&code) else {
        return reject(player_tx, ErrorKind::ValidationFailed("room code must be 6 alphanumeric characters".into())).await;
    };
    let player_name = match validate_player_name(&player_name) {
        Ok(n) => n,
        Err(e) => return reject(player_tx, e).await,
    };
    let Some(room_lock) = find_room(state, &code).await else {
        return reject(player_tx, ErrorKind::NotFound("no room with that code".into())).await;
    };

    let mut room = room_lock.lock().await;
    if room.password.as_deref().is_some_and(|expected| Some(expected) != password.as_deref()) {
        return reject(player_tx, ErrorKind::Forbidden("incorrect room password".into())).await;
    }
    let already_present = room.players.iter().any(|p| p == &player_id) || room.spectators.iter().any(|p| p == &player_id);

    if already_present {
        // Rejoining with the same player_id is idempotent (spec.md:67): just
        // resend the session its current view instead of erroring.
        room.sessions.insert(player_id.clone(), player_tx.clone());
        room.touch();
        broadcast_room_state(&room).await;
        if room.status == protocol::RoomStatus::Playing {
            broadcast_game_state(&room).await;
        }
        drop(room);

        membership.room_code = Some(code);
        membership.player_id = Some(player_id);
        return;
    }

    let joins_as_player = room.status == protocol::RoomStatus::Waiting || is_multi_player_joinable(room.game_type);
    if joins_as_player && room.players.len() >= MAX_PLAYERS {
        return reject(player_tx, ErrorKind::Full).await;
    }

    if joins_as_player {
        room.players.push(player_id.clone());
    } else {
        room.spectators.push(player_id.clone());
    }
    room.player_names.insert(player_id.clone(), player_name.clone());
    room.sessions.insert(player_id.clone(), player_tx.clone());
    room.touch();

    broadcast_room(&room, OutboundMessage::PlayerJoined { player_id: player_id.clone(), player_name }).await;
    broadcast_room_state(&room).await;
    if room.status == protocol::RoomStatus::Playing {
        broadcast_game_state(&room).await;
    }
    drop(room);

    membership.room_code = Some(code);
    membership.player_id = Some(player_id);
}

pub async fn leave_room(state: &Arc<AppState>, code: &str, player_id: &str) {
    let Some(room_lock) = find_room(state, code).await else { return };
    let mut room = room_lock.lock().await;
    room.players.retain(|p| p != player_id);
    room.spectators.retain(|p| p != player_id);
    room.sessions.remove(player_id);
    room.player_names.remove(player_id);
    room.touch();

    if room.host == player_id {
        if let Some(next_host) = room.players.first().cloned() {
            room.host = next_host;
        }
    }

    // A room with no players left is destroyed even if spectators remain
    // connected (spec.md:75); otherwise it survives with a stale `host` that
    // no longer points at a member of `players` (I1).
    let empty = room.is_empty() || room.players.is_empty();
    if !empty {
        broadcast_room(&room, OutboundMessage::PlayerLeft { player_id: player_id.to_string() }).await;
        broadcast_room_state(&room).await;
    } else if !room.is_empty() {
        // Players are gone but spectators are still connected: tell them the
        // room is going away before it's dropped from the registry.
        broadcast_room(&room, OutboundMessage::RoomState { room: None }).await;
    }
    drop(room);

    if empty {
        state.rooms.lock().await.remove(code);
        state.timers.cancel_all_for_room(&code.to_string()).await;
    }
}

async fn handle_leave_room(state: &Arc<AppState>, membership: &mut Membership, code: String, player_id: PlayerId) {
    leave_room(state, &code, &player_id).await;
    if membership.room_code.as_deref() == Some(code.as_str()) {
        membership.room_code = None;
        membership.player_id = None;
    }
}

async fn handle_start_game(state: &Arc<AppState>, player_tx: &mpsc::UnboundedSender<OutboundMessage>, code: String, player_id: PlayerId) {
    let Some(room_lock) = find_room(state, &code).await else {
        return reject(player_tx, ErrorKind::NotFound("no room with that code".into())).await;
    };
    let mut room = room_lock.lock().await;
    if room.host != player_id {
        return reject(player_tx, ErrorKind::Forbidden("only the host may start the game".into())).await;
    }
    if room.status != protocol::RoomStatus::Waiting {
        return reject(player_tx, ErrorKind::Conflict("game already started".into())).await;
    }
    let min_players = Engine::min_players(room.game_type) as usize;
    if room.players.len() < min_players {
        return reject(player_tx, ErrorKind::ValidationFailed(format!("needs at least {min_players} players"))).await;
    }

    room.epoch += 1;
    let engine = Engine::new(room.game_type, &room.players, &room.game_mode);
    let initial_timers = engine.initial_timers();
    room.engine = Some(engine);
    room.status = protocol::RoomStatus::Playing;
    room.game_id = Some(random_game_id());
    room.touch();

    broadcast_room_state(&room).await;
    broadcast_game_state(&room).await;

    let epoch = room.epoch;
    let code = room.code.clone();
    drop(room);
    for timer in initial_timers {
        apply_timer_command(state, &code, epoch, timer).await;
    }
}

/// `"game_"` plus 8 random lowercase-alphanumeric characters (§4.2).
fn random_game_id() -> String {
    use rand::distr::Alphanumeric;
    use rand::Rng;
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("game_{suffix}")
}

async fn handle_make_move(
    state: &Arc<AppState>,
    player_tx: &mpsc::UnboundedSender<OutboundMessage>,
    game_id: String,
    player_id: PlayerId,
    fields: Map<String, serde_json::Value>,
) {
    let rooms = state.rooms.lock().await;
    let Some(room_lock) = rooms
        .values()
        .find(|r| r.try_lock().map(|room| room.game_id.as_deref() == Some(game_id.as_str())).unwrap_or(false))
        .cloned()
    else {
        drop(rooms);
        return reject(player_tx, ErrorKind::NotFound("no active game with that id".into())).await;
    };
    drop(rooms);

    let mut room = room_lock.lock().await;
    let Some(engine) = room.engine.as_mut() else {
        return reject(player_tx, ErrorKind::NotFound("game has no engine instantiated".into())).await;
    };

    let before_score = jeopardy_score(engine, &player_id);
    let outcome = engine.apply_move(&player_id, serde_json::Value::Object(fields));
    match outcome {
        engine_core::Outcome::Rejected(kind) => {
            reject(player_tx, kind).await;
        }
        engine_core::Outcome::Changed { timers, timeout_note, .. } => {
            room.touch();
            let epoch = room.epoch;
            let code = room.code.clone();
            drop(room);
            for timer in timers {
                apply_timer_command(state, &code, epoch, timer).await;
            }

            let room = room_lock.lock().await;
            if let Some(note) = timeout_note {
                broadcast_room(&room, OutboundMessage::Timeout { reason: note }).await;
            }
            let delta = jeopardy_score(room.engine.as_ref().unwrap(), &player_id).saturating_sub(before_score);
            let player_name = room.player_names.get(&player_id).cloned().unwrap_or_default();
            broadcast_game_state(&room).await;
            drop(room);
            if delta > 0 {
                state.record_score(&player_id, &player_name, delta).await;
            }
        }
    }
}

fn jeopardy_score(engine: &Engine, player_id: &str) -> u64 {
    if engine.game_type() != GameType::Jeopardy {
        return 0;
    }
    engine.snapshot()["scores"][player_id].as_u64().unwrap_or(0)
}

async fn apply_timer_command(state: &Arc<AppState>, room_code: &RoomCode, epoch: u64, cmd: engine_core::TimerCommand) {
    match cmd {
        engine_core::TimerCommand::Set { timer_id, duration_ms } => {
            let state = state.clone();
            let room_code_for_fire = room_code.clone();
            state
                .timers
                .set(room_code.clone(), timer_id, duration_ms, async move {
                    fire_timer(&state, &room_code_for_fire, epoch, timer_id).await;
                })
                .await;
        }
        engine_core::TimerCommand::Cancel { timer_id } => {
            state.timers.cancel(room_code, timer_id).await;
        }
    }
}

async fn fire_timer(state: &Arc<AppState>, room_code: &RoomCode, epoch: u64, timer_id: u32) {
    let Some(room_lock) = find_room(state, room_code).await else { return };
    let mut room = room_lock.lock().await;
    if room.epoch != epoch {
        return;
    }
    let Some(engine) = room.engine.as_mut() else { return };
    let outcome = engine.on_timer(timer_id);
    if let engine_core::Outcome::Changed { timers, timeout_note, .. } = outcome {
        room.touch();
        let code = room.code.clone();
        drop(room);
        for timer in timers {
            apply_timer_command(state, &code, epoch, timer).await;
        }
        let room = room_lock.lock().await;
        if let Some(note) = timeout_note {
            broadcast_room(&room, OutboundMessage::Timeout { reason: note }).await;
        }
        broadcast_game_state(&room).await;
    }
}

async fn handle_chat_message(state: &Arc<AppState>, player_tx: &mpsc::UnboundedSender<OutboundMessage>, room_code: String, player_id: PlayerId, text: String) {
    let Some(room_lock) = find_room(state, &room_code).await else {
        return reject(player_tx, ErrorKind::NotFound("no room with that code".into())).await;
    };
    let room = room_lock.lock().await;
    let sent_at = chrono::Utc::now().to_rfc3339();
    broadcast_room(&room, OutboundMessage::ChatMessage { player_id, text, sent_at }).await;
}

async fn handle_quick_match(state: &Arc<AppState>, player_tx: &mpsc::UnboundedSender<OutboundMessage>, player_id: PlayerId, game_type: GameType) {
    let mut queue = state.quick_match.lock().await;
    let waiting = queue.entry(game_type).or_default();

    if waiting.iter().any(|entry| entry.player_id == player_id) {
        return reject(player_tx, ErrorKind::Conflict("already in queue".into())).await;
    }

    waiting.push(QuickMatchEntry { player_id: player_id.clone(), player_name: player_id.clone(), tx: player_tx.clone() });
    send_to(player_tx, OutboundMessage::QuickMatch { status: "waiting".to_string() }).await;

    if waiting.len() < 2 {
        return;
    }

    let matched: Vec<QuickMatchEntry> = waiting.drain(..2).collect();
    drop(queue);

    let code = state.fresh_room_code().await;
    let host = matched[0].player_id.clone();
    let mut room = Room::new(code.clone(), host, game_type, "classic".to_string(), None);
    for entry in &matched {
        room.players.push(entry.player_id.clone());
        room.player_names.insert(entry.player_id.clone(), entry.player_name.clone());
        room.sessions.insert(entry.player_id.clone(), entry.tx.clone());
    }
    state.rooms.lock().await.insert(code.clone(), Arc::new(tokio::sync::Mutex::new(room)));

    for entry in &matched {
        send_to(&entry.tx, OutboundMessage::QuickMatchFound { code: code.clone() }).await;
    }
}

async fn handle_leaderboard(state: &Arc<AppState>, player_tx: &mpsc::UnboundedSender<OutboundMessage>) {
    let top = state.top_leaderboard(10).await;
    let entries = top
        .into_iter()
        .map(|(player_id, entry)| protocol::LeaderboardEntryDto { player_id, player_name: entry.player_name, score: entry.score })
        .collect();
    send_to(player_tx, OutboundMessage::Leaderboard { entries }).await;
}
