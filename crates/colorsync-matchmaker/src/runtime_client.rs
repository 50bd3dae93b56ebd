//! The Matchmaker → Runtime handoff.
//!
//! A short-lived service credential, distinct key material from user
//! credentials, accompanies the announcement. The Runtime rejects
//! announcements that fail this check.

use colorsync_core::auth::mint_service_token;
use colorsync_core::protocol::{GameStartRequest, PlayerId};

/// TTL for the minted service credential. The call is synchronous from the
/// Matchmaker's point of view and completes in well under this window.
const SERVICE_TOKEN_TTL_SECS: u64 = 30;

#[derive(Clone)]
pub struct RuntimeClient {
    http: reqwest::Client,
    base_url: String,
    service_token_secret: Vec<u8>,
}

impl RuntimeClient {
    pub fn new(base_url: String, service_token_secret: Vec<u8>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            service_token_secret,
        }
    }

    /// Announce a newly-paired room to the Runtime.
    ///
    /// Fire-and-forget: a failed announce must not block or undo the
    /// pairing. It is logged; the client will observe
    /// game-not-found on its first connection attempt and may retry.
    pub async fn announce(&self, room_id: String, players: [PlayerId; 2]) {
        let token = match mint_service_token("matchmaker", SERVICE_TOKEN_TTL_SECS, &self.service_token_secret) {
            Ok(token) => token,
            Err(e) => {
                tracing::error!(room_id, error = %e, "failed to mint service token for handoff");
                return;
            }
        };

        let url = format!("{}/game/start", self.base_url);
        let body = GameStartRequest { room_id: room_id.clone(), players };

        match self
            .http
            .post(&url)
            .header("X-Service-Token", token)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(room_id, "announced room to runtime");
            }
            Ok(resp) => {
                tracing::warn!(room_id, status = %resp.status(), "runtime rejected announcement");
            }
            Err(e) => {
                tracing::warn!(room_id, error = %e, "runtime announcement failed, clients will retry via the game-exists probe");
            }
        }
    }
}
