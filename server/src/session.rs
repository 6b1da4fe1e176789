//! Per-connection websocket handling. Ported from the teacher's
//! `handle_server_logic`/`handle_client_logic` shape in `processing_module`:
//! split the socket into a sink and a stream, hand each to its own task, and
//! have the two race in a `tokio::select!` so whichever finishes first (an
//! error, a closed socket, a protocol violation) aborts the other rather
//! than leaving it to block forever on a half-dead connection.
//!
//! Where the teacher's protocol is a binary, length-tagged command byte over
//! a broadcast channel, this one is JSON text frames decoded straight into
//! [`InboundMessage`] and dispatched through `dispatch::handle`.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use protocol::{InboundMessage, OutboundMessage, MAX_MALFORMED_FRAMES};
use tokio::sync::{mpsc, Mutex};

use crate::dispatch::{self, Membership};
use crate::state::AppState;

pub async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let (sender, receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));
    let (tx, rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let membership = Arc::new(Mutex::new(Membership::default()));

    let mut send_task = tokio::spawn(send_logic(sender, rx));
    let mut receive_task = tokio::spawn(receive_logic(receiver, state.clone(), membership.clone(), tx));

    tokio::select! {
        _ = &mut send_task => { receive_task.abort(); }
        _ = &mut receive_task => { send_task.abort(); }
    }

    let final_membership = membership.lock().await;
    if let (Some(room_code), Some(player_id)) = (&final_membership.room_code, &final_membership.player_id) {
        dispatch::leave_room(&state, room_code, player_id).await;
    }
}

/// Drains outbound messages addressed to this session and writes them to
/// the socket. Exits (and so tears down the reader) the moment the socket
/// write fails or every sender handle for `rx` has been dropped.
async fn send_logic(sender: Arc<Mutex<SplitSink<WebSocket, Message>>>, mut rx: mpsc::UnboundedReceiver<OutboundMessage>) {
    let mut sink = sender.lock().await;
    while let Some(msg) = rx.recv().await {
        let text = match serde_json::to_string(&msg) {
            Ok(text) => text,
            Err(err) => {
                tracing::error!(?err, "failed to serialize outbound message");
                continue;
            }
        };
        if let Err(err) = sink.send(Message::Text(text.into())).await {
            tracing::debug!(?err, "websocket send failed, closing connection");
            return;
        }
    }
}

/// Decodes incoming text frames into [`InboundMessage`]s and dispatches
/// them. A malformed frame is tolerated up to [`MAX_MALFORMED_FRAMES`]
/// consecutive times (§4.1) before the connection is torn down; any
/// well-formed frame resets the counter.
async fn receive_logic(
    mut receiver: SplitStream<WebSocket>,
    state: Arc<AppState>,
    membership: Arc<Mutex<Membership>>,
    player_tx: mpsc::UnboundedSender<OutboundMessage>,
) {
    let mut malformed_streak: u32 = 0;

    while let Some(frame) = receiver.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => return,
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(?err, "websocket receive failed, closing connection");
                return;
            }
        };

        let decoded: Result<InboundMessage, _> = serde_json::from_str(&text);
        let msg = match decoded {
            Ok(msg) => {
                malformed_streak = 0;
                msg
            }
            Err(err) => {
                malformed_streak += 1;
                tracing::debug!(?err, streak = malformed_streak, "malformed inbound frame");
                let _ = player_tx.send(OutboundMessage::Error { message: "malformed message".to_string() });
                if malformed_streak >= MAX_MALFORMED_FRAMES {
                    tracing::debug!("too many malformed frames in a row, closing connection");
                    return;
                }
                continue;
            }
        };

        let mut membership = membership.lock().await;
        dispatch::handle(&state, &mut membership, &player_tx, msg).await;
    }
}
