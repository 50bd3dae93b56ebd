//! HTTP handlers for the Matchmaker request surface.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use colorsync_core::auth::verify_user_token;
use colorsync_core::domain::RoomStatus;
use colorsync_core::error::CoreError;
use colorsync_core::protocol::{
    HealthResponse, JoinRequest, JoinResponse, ReadyView, RoomStatusWire, RoomView,
};

use crate::AppState;
use crate::error::ApiError;
use crate::state::JoinOutcome;

fn wire_status(status: RoomStatus) -> RoomStatusWire {
    match status {
        RoomStatus::Waiting => RoomStatusWire::Waiting,
        RoomStatus::Full => RoomStatusWire::Full,
        RoomStatus::Closed => RoomStatusWire::Closed,
    }
}

/// Pull the bearer token out of `Authorization` by hand (as
/// `colorsync-runtime/src/http.rs` does for `X-Service-Token`) rather than
/// via `TypedHeader`, whose rejection bypasses `ApiError` and answers a
/// missing/malformed header with a bare `400` instead of the `401`/`403`
/// class §7 requires for `AuthMissing`/`AuthInvalid`.
fn bearer_token(headers: &HeaderMap) -> Result<&str, CoreError> {
    let value = headers.get(AUTHORIZATION).ok_or(CoreError::AuthMissing)?;
    let value = value.to_str().map_err(|_| CoreError::AuthInvalid)?;
    value.strip_prefix("Bearer ").ok_or(CoreError::AuthInvalid)
}

/// `POST /join`.
pub async fn join(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, ApiError> {
    let token = bearer_token(&headers)?;
    let claims = verify_user_token(token, &state.config.user_token_secret)
        .map_err(|_| CoreError::AuthInvalid)?;

    if claims.user_id != req.user_id {
        return Err(CoreError::AuthMismatch.into());
    }

    if !state.identity.exists(&req.user_id).await.unwrap_or(false) {
        return Err(CoreError::UnknownPlayer.into());
    }

    let outcome = state.rooms.join(&req.user_id).await?;

    let response = match outcome {
        JoinOutcome::Waiting(room) => JoinResponse {
            room_id: room.room_id,
            players: room.players,
            status: RoomStatusWire::Waiting,
            message: "waiting for an opponent".to_string(),
        },
        JoinOutcome::Full(room) => {
            let players: [String; 2] = room
                .players
                .clone()
                .try_into()
                .expect("a room transitions to Full with exactly two players");

            // Handoff must not block the caller's response.
            let runtime = state.runtime.clone();
            let room_id = room.room_id.clone();
            tokio::spawn(async move {
                runtime.announce(room_id, players.clone()).await;
            });

            JoinResponse {
                room_id: room.room_id,
                players: room.players,
                status: RoomStatusWire::Full,
                message: "room is full, connect to the runtime".to_string(),
            }
        }
    };

    Ok(Json(response))
}

/// `GET /rooms/{id}` — public read.
pub async fn get_room(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomView>, ApiError> {
    let room = state
        .rooms
        .get(&room_id)
        .await
        .ok_or_else(|| CoreError::RoomNotFound(room_id.clone()))?;

    Ok(Json(RoomView {
        id: room.room_id,
        players: room.players,
        status: wire_status(room.status),
    }))
}

/// `GET /room/{id}/ready`.
pub async fn room_ready(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<ReadyView>, ApiError> {
    let room = state
        .rooms
        .get(&room_id)
        .await
        .ok_or_else(|| CoreError::RoomNotFound(room_id.clone()))?;

    Ok(Json(ReadyView {
        ready: room.players.len() == 2,
        players: room.players,
    }))
}

/// `POST /rooms/{id}/leave`.
pub async fn leave_room(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(room_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = bearer_token(&headers)?;
    let claims = verify_user_token(token, &state.config.user_token_secret)
        .map_err(|_| CoreError::AuthInvalid)?;

    state.rooms.leave(&room_id, &claims.user_id).await?;
    Ok(StatusCode::OK)
}

/// `GET /health`.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::default())
}
