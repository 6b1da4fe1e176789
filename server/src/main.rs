mod broadcast;
mod dispatch;
mod janitor;
mod room;
mod session;
mod state;
mod timer_registry;

use std::sync::Arc;

use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use protocol::JANITOR_INTERVAL_SECS;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::state::AppState;

#[tokio::main]
/// Initializes tracing, spawns the idle-room janitor, then serves the `/ws`
/// upgrade route plus a couple of operator endpoints. Listens on port 8080.
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=trace", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(true)
                .with_line_number(true)
                .with_target(true)
                .with_thread_ids(true)
                .with_thread_names(true),
        )
        .init();

    let app_state = Arc::new(AppState::default());

    let janitor_state = app_state.clone();
    tokio::spawn(async move {
        janitor::run(janitor_state, JANITOR_INTERVAL_SECS).await;
    });

    let app = Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_handler))
        .route("/rooms", get(rooms_handler))
        .with_state(app_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();

    tracing::info!("listening on 0.0.0.0:8080");
    axum::serve(listener, app).await.unwrap();
}

async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| session::handle_connection(socket, state))
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Lists every room currently in the registry, grounded on the teacher's
/// `enlist_handler` debug endpoint.
async fn rooms_handler(State(state): State<Arc<AppState>>) -> String {
    let rooms = state.rooms.lock().await;
    let mut lines = Vec::with_capacity(rooms.len());
    for (code, room_lock) in rooms.iter() {
        if let Ok(room) = room_lock.try_lock() {
            lines.push(format!(
                "Room: {:<8} Game: {:<12} Players: {:02} Status: {:?}",
                code,
                format!("{:?}", room.game_type),
                room.players.len(),
                room.status
            ));
        }
    }
    lines.join("\n")
}
