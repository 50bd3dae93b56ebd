//! Game Runtime: runs the Stroop-effect round scheduler for games handed
//! off by the Matchmaker and serves the per-game WebSocket session.
//!
//! # Routes
//!
//! | Method | Path                               | Description                    |
//! |--------|-------------------------------------|-------------------------------- |
//! | `POST` | `/game/start`                       | Matchmaker handoff (service cred) |
//! | `GET`  | `/game/status?room_id={id}`         | Game status probe               |
//! | `GET`  | `/game/ws?room_id={id}&user_id={id}`| WebSocket session upgrade        |
//! | `GET`  | `/health`                            | Liveness probe                  |
//!
//! The library crate exists so integration tests can build a real router
//! against a real `TcpListener` without going through `main`.

pub mod config;
pub mod error;
pub mod http;
pub mod manager;
pub mod scheduler;
pub mod session;
pub mod ws_handler;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use config::Config;
use manager::GameManager;

/// Shared application state available to all handlers.
pub struct AppState {
    pub config: Config,
    pub games: Arc<GameManager>,
}

/// Build the Axum router and shared state from a config, without binding a
/// socket or starting a runtime — used by both `main` and integration tests.
pub fn build_app(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        games: Arc::new(GameManager::new()),
        config,
    });

    let app = Router::new()
        .route("/game/start", post(http::game_start))
        .route("/game/status", get(http::game_status))
        .route("/game/ws", get(http::game_ws))
        .route("/health", get(http::health))
        .layer(CorsLayer::permissive())
        .with_state(state.clone());

    (app, state)
}
