//! JWT token management (HS256, symmetric secret).
//!
//! The signing algorithm is pinned on both encode and decode; a token
//! presenting any other algorithm (including "none") fails validation.

pub mod error;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

pub use error::JwtError;

/// Claims embedded in bearer tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the owning user id
    pub sub: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration (unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// The user id bound to this token, if the subject parses
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

/// Manages bearer token creation and validation
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: i64,
}

impl JwtManager {
    /// Creates a new `JwtManager` with the given symmetric secret
    #[must_use]
    pub fn new(secret: &[u8], token_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_secs,
        }
    }

    /// Issues a token binding the given user identity
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError` if signing fails
    pub fn issue_token(&self, user_id: i64) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.token_ttl_secs,
        };

        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    /// Validates a token and returns its claims
    ///
    /// # Errors
    ///
    /// Returns `JwtError::ValidationError` for expired, tampered or
    /// wrongly-signed tokens
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {e}");
                JwtError::ValidationError
            })?;

        Ok(data.claims)
    }
}
