//! Session token handling (JWT, HMAC-SHA256)
//!
//! Login issues a signed session token; protected routes validate the
//! signature and expiration here, then resolve the account server-side. The
//! role claim inside the token is informational for clients only; the
//! authorization layer always uses the role stored in the database.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject (account UUID as string)
    pub sub: String,
    /// Login name at issue time
    pub username: String,
    /// Role at issue time ("Manager" or "Owner")
    pub role: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

impl SessionClaims {
    pub fn new(account_id: String, username: String, role: String, validity: Duration) -> Self {
        let now = Utc::now();
        let exp = now + validity;

        Self {
            sub: account_id,
            username,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            iss: "orchard-api".to_string(),
            aud: "orchard-web".to_string(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }
}

/// Session token errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session token encoding error: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("Session token expired")]
    TokenExpired,

    #[error("Invalid session token")]
    InvalidToken,
}

/// Validates session tokens using HMAC-SHA256 (symmetric secret).
///
/// Checks signature and expiration only; issuer/audience are not enforced so
/// that rotating those strings does not invalidate live sessions.
pub struct SessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.validate_nbf = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims into a compact token string.
    pub fn encode(secret: &[u8], claims: &SessionClaims) -> Result<String, SessionError> {
        let token = encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret),
        )?;
        Ok(token)
    }

    /// Validate a token and return its claims.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, SessionError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::InvalidToken,
            },
        )?;
        Ok(data.claims)
    }
}
