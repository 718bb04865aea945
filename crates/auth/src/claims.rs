use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use warden_core::{CompanyId, LocationId, RoleId, UserId};

use crate::identity::Identity;
use crate::roles::AccessLevel;
use crate::token::TokenError;

/// Signed token payload.
///
/// Timestamps are JWT numeric dates (whole seconds since the epoch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    #[serde(rename = "rid")]
    pub role_id: RoleId,

    #[serde(rename = "lvl")]
    pub access_level: AccessLevel,

    #[serde(rename = "cid")]
    pub company_id: CompanyId,

    #[serde(rename = "lid")]
    pub location_id: LocationId,

    pub iat: i64,
    pub exp: i64,
}

impl TokenClaims {
    /// Claims for `identity`, valid from `issued_at` for `ttl`.
    ///
    /// A zero or negative `ttl` produces claims that are already expired. A
    /// positive `ttl` shorter than the seconds granularity still yields a
    /// token that is valid at `issued_at`.
    pub fn new(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, TokenError> {
        let deadline = issued_at
            .checked_add_signed(ttl)
            .ok_or(TokenError::ExpiryOutOfRange)?;

        let iat = issued_at.timestamp();
        let exp = if ttl > Duration::zero() {
            deadline.timestamp().max(iat + 1)
        } else {
            deadline.timestamp()
        };

        let claims = Self {
            sub: identity.user_id,
            role_id: identity.role_id,
            access_level: identity.access_level,
            company_id: identity.company_id,
            location_id: identity.location_id,
            iat,
            exp,
        };
        match claims.expires_at() {
            Some(_) => Ok(claims),
            None => Err(TokenError::ExpiryOutOfRange),
        }
    }

    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.sub,
            role_id: self.role_id,
            access_level: self.access_level,
            company_id: self.company_id,
            location_id: self.location_id,
        }
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// Check the claim time window against `now`.
///
/// Signature verification happens before this is ever called; these checks
/// only run on payloads that are already known to be authentic.
pub fn validate_claims(claims: &TokenClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    let now = now.timestamp();
    if now >= claims.exp {
        return Err(TokenError::Expired);
    }
    if now < claims.iat {
        return Err(TokenError::NotYetValid);
    }
    Ok(())
}
