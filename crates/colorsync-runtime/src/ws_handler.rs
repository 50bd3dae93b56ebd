//! WebSocket handler for the Game Runtime.
//!
//! Each connection is bound to a `(room_id, user_id)` pair up front via the
//! upgrade query string — there is no in-band lobby handshake, since
//! `OpenSession` already knows which game and player it's for.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use colorsync_core::protocol::{ClientFrame, PlayerId, ServerFrame};
use futures_util::{SinkExt, StreamExt};

use crate::manager::{GameManager, handle_click};
use crate::scheduler;
use crate::session::{Outbound, PlayerRx};

/// Drive a single WebSocket connection after `OpenSession` has already
/// registered it with the game's [`Session`](crate::session::Session).
///
/// `generation` is the value `OpenSession` assigned this connection; it's
/// handed back to [`GameManager::disconnect`] so a connection that's been
/// superseded by a later reconnect (last-writer-wins, §4.2) can tell its own
/// eventual close apart from the live connection's.
pub async fn handle_socket(
    socket: WebSocket,
    manager: Arc<GameManager>,
    room_id: String,
    player_id: PlayerId,
    mut rx: PlayerRx,
    game_started: bool,
    generation: u64,
) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    if game_started {
        tokio::spawn(scheduler::run_round_scheduler(manager.clone(), room_id.clone()));
    }

    // Write task: drain this player's mpsc receiver and forward frames as
    // text. When a GAME_OVER frame passes through, send it and then close
    // the connection — this is what satisfies "close both connections
    // after GAME_OVER" without any extra signaling between tasks. A `Close`
    // message means this connection has been superseded by a reconnect; it
    // closes the socket immediately without waiting for GAME_OVER.
    let write_handle = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let frame = match message {
                Outbound::Frame(frame) => frame,
                Outbound::Close => {
                    let _ = ws_sink.send(Message::Close(None)).await;
                    break;
                }
            };
            let is_game_over = matches!(frame, ServerFrame::GameOver { .. });
            let Ok(json) = serde_json::to_string(&frame) else {
                continue;
            };
            if ws_sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            if is_game_over {
                let _ = ws_sink.send(Message::Close(None)).await;
                break;
            }
        }
    });

    loop {
        match ws_stream.next().await {
            Some(Ok(Message::Text(text))) => {
                let frame = match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::debug!(room = %room_id, player = %player_id, error = %e, "ignoring unrecognized inbound frame");
                        continue;
                    }
                };
                match frame {
                    ClientFrame::Click { answer } => {
                        if let Some(session) = manager.get(&room_id).await {
                            handle_click(&session, &player_id, answer).await;
                        }
                    }
                    ClientFrame::Ping {} => {
                        if let Some(session) = manager.get(&room_id).await {
                            session.lock().await.send_to_player(&player_id, &ServerFrame::Pong {});
                        }
                    }
                }
            }
            Some(Ok(Message::Close(_))) | None => break,
            Some(Err(_)) => break,
            _ => continue,
        }
    }

    write_handle.abort();
    manager.disconnect(&room_id, &player_id, generation).await;
    tracing::info!(room = %room_id, player = %player_id, "player disconnected");
}
