//! Zero-trust token layer between the Matchmaker and the Game Runtime,
//! plus verification of the user credential the Matchmaker receives from
//! its own callers.
//!
//! Two distinct key materials are in play: a long-lived secret shared with the external identity service
//! for *user* credentials, and a separate secret known only to the
//! Matchmaker and Runtime for *service* credentials. Mixing the two would
//! let a client-obtained user token impersonate a service announcement.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::protocol::PlayerId;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token invalid, expired, or badly signed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("system clock before UNIX epoch")]
    ClockSkew,
}

/// Claims carried by a user credential (`Authorization: Bearer <token>`),
/// minted and signed by the external identity service. The Matchmaker only
/// verifies these; it never issues them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub user_id: PlayerId,
    pub username: String,
    pub exp: usize,
}

/// Verify a user credential against the secret shared with the identity
/// service. Checks both the HS256 signature and the `exp` bound.
pub fn verify_user_token(token: &str, secret: &[u8]) -> Result<UserClaims, AuthError> {
    let data = decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

/// Claims carried by the Matchmaker's service credential
/// (`X-Service-Token` header). Distinct claim shape from [`UserClaims`] so
/// the two token kinds can never be confused even if secrets collided.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceClaims {
    pub iss: String,
    pub exp: usize,
}

/// Mint a short-lived service credential, attached by the Matchmaker to its
/// `/game/start` announcement.
pub fn mint_service_token(
    issuer: &str,
    ttl_secs: u64,
    secret: &[u8],
) -> Result<String, AuthError> {
    let exp = now_unix()?.checked_add(ttl_secs).unwrap_or(u64::MAX);
    let claims = ServiceClaims {
        iss: issuer.to_string(),
        exp: exp as usize,
    };
    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}

/// Verify a service credential presented to the Runtime's `/game/start`.
/// The Runtime rejects announcements that fail this check.
pub fn verify_service_token(token: &str, secret: &[u8]) -> Result<ServiceClaims, AuthError> {
    let data = decode::<ServiceClaims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
}

fn now_unix() -> Result<u64, AuthError> {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| AuthError::ClockSkew)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_token_round_trips() {
        let secret = b"shared-service-secret";
        let token = mint_service_token("matchmaker", 60, secret).unwrap();
        let claims = verify_service_token(&token, secret).unwrap();
        assert_eq!(claims.iss, "matchmaker");
    }

    #[test]
    fn service_token_rejects_wrong_secret() {
        let token = mint_service_token("matchmaker", 60, b"secret-a").unwrap();
        assert!(verify_service_token(&token, b"secret-b").is_err());
    }

    #[test]
    fn user_token_rejects_tampered_signature() {
        let secret = b"identity-secret";
        let claims = UserClaims {
            user_id: "alice".to_string(),
            username: "Alice".to_string(),
            exp: (now_unix().unwrap() + 3600) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )
        .unwrap();
        assert!(verify_user_token(&token, b"wrong-secret").is_err());
        let verified = verify_user_token(&token, secret).unwrap();
        assert_eq!(verified.user_id, "alice");
    }
}
