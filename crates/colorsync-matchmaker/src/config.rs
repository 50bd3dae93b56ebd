//! Environment-driven configuration, read once at startup.
//!
//! Plain `std::env::var(...).unwrap_or_else(...)` reads rather than a config
//! file or CLI parser — there's little enough surface here that a dedicated
//! crate isn't earned.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Port this service listens on.
    pub port: u16,
    /// Base URL of the external identity service.
    pub identity_base_url: String,
    /// Base URL of the Game Runtime, used for the `/game/start` handoff.
    pub runtime_base_url: String,
    /// Secret shared with the identity service, used to verify user
    /// credentials (`Authorization: Bearer <token>`).
    pub user_token_secret: Vec<u8>,
    /// Secret shared only with the Runtime, used to mint the service
    /// credential attached to `/game/start` announcements.
    pub service_token_secret: Vec<u8>,
    /// Bound on the external identity lookup.
    pub identity_lookup_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8002),
            identity_base_url: std::env::var("IDENTITY_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8001".to_string()),
            runtime_base_url: std::env::var("RUNTIME_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8003".to_string()),
            user_token_secret: std::env::var("USER_TOKEN_SECRET")
                .unwrap_or_else(|_| "dev-user-secret".to_string())
                .into_bytes(),
            service_token_secret: std::env::var("SERVICE_TOKEN_SECRET")
                .unwrap_or_else(|_| "dev-service-secret".to_string())
                .into_bytes(),
            identity_lookup_timeout: Duration::from_secs(
                std::env::var("IDENTITY_LOOKUP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
        }
    }
}
