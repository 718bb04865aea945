use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::{CompanyId, DomainError, LocationId, RoleId, UserId};

use crate::roles::AccessLevel;
use crate::token::{TokenError, TokenValidator};

/// The authenticated caller for the current request.
///
/// Derived fresh from a verified token on every request and never mutated
/// afterwards; every RBAC decision takes one of these by reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role_id: RoleId,
    pub access_level: AccessLevel,
    pub company_id: CompanyId,
    pub location_id: LocationId,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthnError {
    #[error("missing credentials")]
    MissingCredentials,

    #[error("authorization scheme must be Bearer")]
    UnsupportedScheme,

    #[error("empty bearer token")]
    EmptyToken,

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl From<AuthnError> for DomainError {
    fn from(_: AuthnError) -> Self {
        DomainError::Unauthenticated
    }
}

/// Resolve the caller from a raw `Authorization` header value.
///
/// Boundary adapter only: it delegates verification to the validator and adds
/// no policy of its own.
pub fn resolve(
    carrier: Option<&str>,
    validator: &dyn TokenValidator,
    now: DateTime<Utc>,
) -> Result<Identity, AuthnError> {
    let carrier = carrier.ok_or(AuthnError::MissingCredentials)?;
    let token = extract_bearer(carrier)?;
    Ok(validator.validate(token, now)?)
}

pub fn extract_bearer(header: &str) -> Result<&str, AuthnError> {
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthnError::UnsupportedScheme)?
        .trim();

    if token.is_empty() {
        return Err(AuthnError::EmptyToken);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Hs256TokenService;
    use chrono::Duration;

    fn identity() -> Identity {
        Identity {
            user_id: UserId::new(7),
            role_id: RoleId::new(4),
            access_level: AccessLevel::new(4),
            company_id: CompanyId::new(1),
            location_id: LocationId::new(2),
        }
    }

    #[test]
    fn resolves_a_valid_bearer_token() {
        let svc = Hs256TokenService::new("test-secret").unwrap();
        let issued = svc.issue(&identity(), Duration::minutes(10)).unwrap();
        let header = format!("Bearer {}", issued.token);

        let resolved = resolve(Some(header.as_str()), &svc, Utc::now()).unwrap();
        assert_eq!(resolved, identity());
    }

    #[test]
    fn missing_carrier_is_unauthenticated() {
        let svc = Hs256TokenService::new("test-secret").unwrap();
        let err = resolve(None, &svc, Utc::now()).unwrap_err();
        assert_eq!(err, AuthnError::MissingCredentials);
        assert_eq!(DomainError::from(err), DomainError::Unauthenticated);
    }

    #[test]
    fn non_bearer_schemes_are_rejected() {
        assert_eq!(
            extract_bearer("Basic dXNlcjpwYXNz").unwrap_err(),
            AuthnError::UnsupportedScheme
        );
        assert_eq!(extract_bearer("Bearer   ").unwrap_err(), AuthnError::EmptyToken);
    }

    #[test]
    fn token_failures_surface_as_unauthenticated() {
        let issuer = Hs256TokenService::new("secret-a").unwrap();
        let verifier = Hs256TokenService::new("secret-b").unwrap();
        let issued = issuer.issue(&identity(), Duration::minutes(10)).unwrap();
        let header = format!("Bearer {}", issued.token);

        let err = resolve(Some(header.as_str()), &verifier, Utc::now()).unwrap_err();
        assert_eq!(err, AuthnError::Token(TokenError::InvalidSignature));
        assert_eq!(DomainError::from(err), DomainError::Unauthenticated);
    }
}
