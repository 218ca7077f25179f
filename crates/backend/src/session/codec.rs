//! Signed session-token codec.
//!
//! Tokens are HS256 JWTs over a minimal `{sub, exp}` payload, signed with a
//! server-held symmetric secret. Holders treat tokens as opaque; verification
//! only ever happens server-side through this codec.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::SessionError;

/// JWT claims payload.
#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    /// Principal ID (UUID string).
    sub: String,
    /// Expiration timestamp (seconds since UNIX epoch).
    exp: u64,
}

/// Verified token contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClaims {
    /// The authenticated principal.
    pub principal_id: Uuid,
    /// Embedded expiry.
    pub expires_at: DateTime<Utc>,
}

/// Why verification rejected a token. Internal: callers outside the session
/// module only ever see the [`Option`] from [`SessionCodec::verify`] or the
/// resolver's state machine.
#[derive(Debug, Error)]
pub(crate) enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("malformed token")]
    Malformed,
}

/// Signs and verifies session tokens.
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SessionCodec {
    /// Build a codec from the server-held symmetric secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Sign a token for `principal_id` expiring at `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Signing`] if the signing backend fails.
    pub fn issue(
        &self,
        principal_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<String, SessionError> {
        let claims = JwtClaims {
            sub: principal_id.to_string(),
            exp: u64::try_from(expires_at.timestamp()).unwrap_or(0),
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(SessionError::Signing)
    }

    /// Verify a token, returning its claims or `None` on *any* failure —
    /// tampered signature, wrong secret, malformed input, or expiry. Callers
    /// must treat `None` identically to "no token".
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<SessionClaims> {
        self.verify_detailed(token).ok()
    }

    /// Verification with the failure reason preserved, for the resolver's
    /// three-state outcome. Expiry is checked here and nowhere else: zero
    /// leeway, so a token is expired the second its `exp` passes.
    pub(crate) fn verify_detailed(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            }
        })?;

        let principal_id = data
            .claims
            .sub
            .parse::<Uuid>()
            .map_err(|_| TokenError::Malformed)?;
        let expires_at = i64::try_from(data.claims.exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(TokenError::Malformed)?;

        Ok(SessionClaims {
            principal_id,
            expires_at,
        })
    }
}
