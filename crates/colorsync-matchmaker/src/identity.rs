//! Client for the external identity service.

use std::time::Duration;

use colorsync_core::error::CoreError;
use colorsync_core::protocol::PlayerId;

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(base_url: String, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("identity HTTP client builds with a fixed timeout");
        Self { http, base_url }
    }

    /// Verify the player exists.
    ///
    /// Bounded by the client's configured timeout. Callers should fail closed on `Err` — turn it into
    /// `CoreError::UnknownPlayer`, never fabricate an identity.
    pub async fn exists(&self, user_id: &PlayerId) -> Result<bool, CoreError> {
        let url = format!("{}/users/{}", self.base_url, user_id);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Transient(e.to_string()))?;

        match response.status() {
            reqwest::StatusCode::OK => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            other => Err(CoreError::Transient(format!(
                "identity service returned unexpected status {other}"
            ))),
        }
    }
}
