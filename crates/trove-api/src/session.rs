//! Signed session cookies.
//!
//! The session context is carried in an HS256-signed JWT stored in a
//! cookie. The token is self-contained: verifying the signature and
//! expiry is the whole session check.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use trove_core::config::session::SessionConfig;
use trove_core::error::{AppError, ErrorKind};
use trove_core::result::AppResult;
use trove_service::SessionContext;

/// Claims embedded in the session cookie.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    /// Subject: the user's public uuid.
    sub: String,
    /// Expiry, seconds since epoch.
    exp: i64,
    /// Issued at, seconds since epoch.
    iat: i64,
    /// The session context itself.
    ctx: SessionContext,
}

/// Issues and verifies session cookies.
#[derive(Clone)]
pub struct SessionSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
    cookie_name: String,
}

impl SessionSigner {
    /// Build a signer from configuration.
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.signing_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.signing_key.as_bytes()),
            ttl: Duration::minutes(config.ttl_minutes as i64),
            cookie_name: config.cookie_name.clone(),
        }
    }

    /// The cookie the session token is stored under.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Issue a signed token for a freshly established session.
    pub fn issue(&self, ctx: &SessionContext) -> AppResult<String> {
        let now = Utc::now();
        let claims = SessionClaims {
            sub: ctx.user_uuid.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
            ctx: ctx.clone(),
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            AppError::with_source(ErrorKind::Internal, "Failed to sign session token", e)
        })
    }

    /// Verify a token and recover its session context.
    pub fn verify(&self, token: &str) -> AppResult<SessionContext> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &Validation::default())
            .map_err(|_| AppError::authentication("Invalid or expired session"))?;
        Ok(data.claims.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn signer(key: &str) -> SessionSigner {
        SessionSigner::new(&SessionConfig {
            signing_key: key.to_string(),
            ttl_minutes: 60,
            cookie_name: "trove_session".to_string(),
        })
    }

    fn context() -> SessionContext {
        SessionContext {
            user_id: 7,
            user_uuid: Uuid::new_v4(),
            display_name: "Alice".to_string(),
            avatar_url: None,
            default_folder_uuid: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_issue_verify_roundtrip() {
        let signer = signer("test-signing-key-with-enough-length");
        let ctx = context();

        let token = signer.issue(&ctx).unwrap();
        let recovered = signer.verify(&token).unwrap();
        assert_eq!(recovered.user_uuid, ctx.user_uuid);
        assert_eq!(recovered.default_folder_uuid, ctx.default_folder_uuid);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = signer("key-one-key-one-key-one-key-one")
            .issue(&context())
            .unwrap();
        let err = signer("key-two-key-two-key-two-key-two")
            .verify(&token)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_garbage_rejected() {
        let signer = signer("test-signing-key-with-enough-length");
        assert!(signer.verify("not-a-token").is_err());
    }
}
