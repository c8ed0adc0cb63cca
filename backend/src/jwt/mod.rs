//! Verification of user access tokens issued by the identity provider.
//!
//! The identity provider signs access tokens with HMAC-SHA256 (HS256) using a
//! secret shared with this service. A token is accepted when:
//! - the header names `alg = "HS256"`
//! - the signature matches the shared secret
//! - `exp` and `nbf` hold within a small clock skew
//! - `aud` contains the configured audience
//! - `sub` is usable as a storage namespace

pub mod error;
mod types;

#[cfg(test)]
mod tests;

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

pub use types::{Audience, Claims};

use crate::{identity::IdentityProvider, media_storage::is_valid_namespace, types::Environment};
use error::JwtError;

/// Tolerated clock difference between the identity provider and this service
pub const CLOCK_SKEW_SECS: u64 = 60;

/// HS256 access-token verifier
#[derive(Clone)]
pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    audience: Option<String>,
}

impl std::fmt::Debug for JwtManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtManager")
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl JwtManager {
    /// Creates a verifier from the environment's secret and audience
    #[must_use]
    pub fn new(environment: &Environment) -> Self {
        let manager = Self::with_secret(environment.jwt_secret(), Some(environment.jwt_audience()));
        tracing::info!(audience = ?manager.audience, "JWT manager initialized");
        manager
    }

    /// Creates a verifier from an explicit secret; `None` skips the audience check
    #[must_use]
    pub fn with_secret(secret: impl AsRef<[u8]>, audience: Option<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            audience,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = CLOCK_SKEW_SECS;
        validation.validate_nbf = true;
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }
        validation
    }

    /// Verifies `token` and returns its claims
    ///
    /// # Errors
    ///
    /// Returns the first failed check, see [`JwtError`]
    pub fn validate(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation())?;

        if !is_valid_namespace(&token_data.claims.sub) {
            return Err(JwtError::InvalidSubject);
        }

        Ok(token_data.claims)
    }

    /// Issues a token for `subject` valid for `ttl`, signed with the shared secret.
    ///
    /// Tokens are normally minted by the identity provider; this exists for local
    /// tooling and tests that need a session.
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError`
    pub fn issue_token(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(ttl.as_secs()).map_err(|e| JwtError::EncodingError(e.to_string()))?;

        self.sign(&Claims {
            sub: subject.to_string(),
            aud: self.audience.clone().map(Audience::Single),
            exp: now + ttl,
            iat: Some(now),
            nbf: None,
        })
    }

    /// Signs arbitrary claims with HS256
    ///
    /// # Errors
    ///
    /// Returns `JwtError::EncodingError`
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))
    }
}

#[async_trait::async_trait]
impl IdentityProvider for JwtManager {
    async fn resolve_user_id(&self, access_token: &str) -> Option<String> {
        match self.validate(access_token) {
            Ok(claims) => Some(claims.sub),
            Err(err) => {
                tracing::debug!(error = %err, "Rejected access token");
                None
            }
        }
    }
}
