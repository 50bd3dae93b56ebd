//! Environment-driven configuration, read once at startup (same idiom as
//! the Matchmaker's `config.rs`).

#[derive(Debug, Clone)]
pub struct Config {
    /// Port this service listens on.
    pub port: u16,
    /// Secret shared only with the Matchmaker, used to verify the service
    /// credential attached to `/game/start` announcements.
    pub service_token_secret: Vec<u8>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8003),
            service_token_secret: std::env::var("SERVICE_TOKEN_SECRET")
                .unwrap_or_else(|_| "dev-service-secret".to_string())
                .into_bytes(),
        }
    }
}
