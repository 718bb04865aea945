//! HS256 bearer tokens carrying an [`Identity`].

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::claims::{TokenClaims, validate_claims};
use crate::identity::Identity;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued in the future)")]
    NotYetValid,

    #[error("token claims are malformed: {0}")]
    Malformed(String),

    #[error("signing key must not be empty")]
    EmptyKey,

    #[error("token encoding failed: {0}")]
    Encode(String),

    #[error("token expiry is outside the representable time range")]
    ExpiryOutOfRange,
}

/// Verifies a raw token and yields the identity it carries.
///
/// The auth middleware holds this as `Arc<dyn TokenValidator>`.
pub trait TokenValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError>;
}

/// A freshly signed token and its absolute expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Issues and validates HS256 tokens with a single process-wide secret.
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl core::fmt::Debug for Hs256TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenService").finish_non_exhaustive()
    }
}

impl Hs256TokenService {
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(TokenError::EmptyKey);
        }

        // Time checks are done by `validate_claims` so expiry is exact (no leeway).
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    pub fn issue(&self, identity: &Identity, ttl: Duration) -> Result<IssuedToken, TokenError> {
        self.issue_at(identity, ttl, Utc::now())
    }

    pub fn issue_at(
        &self,
        identity: &Identity,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let claims = TokenClaims::new(identity, now, ttl)?;
        let expires_at = claims.expires_at().ok_or(TokenError::ExpiryOutOfRange)?;

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify the signature over the raw `header.payload` bytes.
    ///
    /// Runs before any segment is decoded, so a tampered token is reported as
    /// a bad signature no matter which byte changed.
    fn verify_signature(&self, token: &str) -> Result<(), TokenError> {
        let (message, signature) = token.rsplit_once('.').ok_or(TokenError::InvalidSignature)?;

        match jsonwebtoken::crypto::verify(signature, message.as_bytes(), &self.decoding, Algorithm::HS256) {
            Ok(true) => Ok(()),
            Ok(false) | Err(_) => Err(TokenError::InvalidSignature),
        }
    }
}

impl TokenValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Identity, TokenError> {
        self.verify_signature(token)?;

        let claims = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding, &self.validation)
            .map_err(|e| TokenError::Malformed(e.to_string()))?
            .claims;

        validate_claims(&claims, now)?;
        Ok(claims.identity())
    }
}
