//! Matchmaker: pairs arriving players into two-player rooms and hands full
//! rooms off to the Game Runtime.
//!
//! # Routes
//!
//! | Method | Path                 | Description                            |
//! |--------|----------------------|---------------------------------------- |
//! | `POST` | `/join`              | Queue a verified player, pair if possible |
//! | `GET`  | `/rooms/{id}`        | Public room lookup                     |
//! | `GET`  | `/room/{id}/ready`   | Whether a room has two players         |
//! | `POST` | `/rooms/{id}/leave`  | Remove the caller from a room          |
//! | `GET`  | `/health`            | Liveness probe                         |

mod config;
mod error;
mod handlers;
mod identity;
mod runtime_client;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use config::Config;
use identity::IdentityClient;
use runtime_client::RuntimeClient;
use state::RoomTable;

/// Shared application state available to all handlers.
pub struct AppState {
    config: Config,
    rooms: RoomTable,
    identity: IdentityClient,
    runtime: RuntimeClient,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();

    let state = Arc::new(AppState {
        identity: IdentityClient::new(config.identity_base_url.clone(), config.identity_lookup_timeout),
        runtime: RuntimeClient::new(config.runtime_base_url.clone(), config.service_token_secret.clone()),
        rooms: RoomTable::new(),
        config: config.clone(),
    });

    let app = Router::new()
        .route("/join", post(handlers::join))
        .route("/rooms/{id}", get(handlers::get_room))
        .route("/room/{id}/ready", get(handlers::room_ready))
        .route("/rooms/{id}/leave", post(handlers::leave_room))
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "matchmaker listening");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
