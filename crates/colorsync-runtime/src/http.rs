//! HTTP + WebSocket upgrade handlers for the Game Runtime.

use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::{Json, http::HeaderMap};
use colorsync_core::auth::verify_service_token;
use colorsync_core::domain::GameStatus;
use colorsync_core::error::CoreError;
use colorsync_core::protocol::{
    GameStartRequest, GameStartResponse, GameStatusResponse, GameStatusWire, HealthResponse,
};
use serde::Deserialize;

use crate::AppState;
use crate::error::ApiError;
use crate::ws_handler;

fn wire_status(status: GameStatus) -> GameStatusWire {
    match status {
        GameStatus::WaitingForPlayers => GameStatusWire::WaitingForPlayers,
        GameStatus::InProgress => GameStatusWire::InProgress,
        GameStatus::Finished => GameStatusWire::Finished,
        GameStatus::Completed => GameStatusWire::Completed,
    }
}

/// `POST /game/start` — the Matchmaker's handoff announcement, authenticated
/// by a service credential rather than a user credential.
pub async fn game_start(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<GameStartRequest>,
) -> Result<Json<GameStartResponse>, ApiError> {
    let token = headers
        .get("X-Service-Token")
        .and_then(|v| v.to_str().ok())
        .ok_or(CoreError::AuthMissing)?;

    verify_service_token(token, &state.config.service_token_secret).map_err(|_| CoreError::AuthInvalid)?;

    let status = state.games.start_game(req.room_id.clone(), req.players).await?;

    Ok(Json(GameStartResponse {
        room_id: req.room_id,
        status: wire_status(status),
    }))
}

#[derive(Debug, Deserialize)]
pub struct GameStatusQuery {
    pub room_id: String,
}

/// `GET /game/status?room_id={id}`.
pub async fn game_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GameStatusQuery>,
) -> Result<Json<GameStatusResponse>, ApiError> {
    let status = state
        .games
        .status(&query.room_id)
        .await
        .ok_or_else(|| CoreError::GameNotFound(query.room_id.clone()))?;

    Ok(Json(GameStatusResponse {
        room_id: query.room_id,
        status: wire_status(status),
    }))
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub room_id: String,
    pub user_id: String,
}

/// `/game/ws?room_id={id}&user_id={id}` — upgrade and hand off to
/// [`ws_handler::handle_socket`].
pub async fn game_ws(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let opened = state.games.open_session(&query.room_id, &query.user_id).await?;

    Ok(ws.on_upgrade(move |socket| {
        ws_handler::handle_socket(
            socket,
            state.games.clone(),
            query.room_id,
            query.user_id,
            opened.rx,
            opened.game_started,
            opened.generation,
        )
    }))
}

/// `GET /health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
