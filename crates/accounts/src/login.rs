//! Username/password login.

use std::sync::Arc;

use chrono::Duration;
use serde::Deserialize;

use warden_auth::{Hs256TokenService, Identity, IssuedToken, PasswordHasher, RoleTable};
use warden_core::{DomainError, DomainResult};

use crate::service::role_level;
use crate::store::UserStore;

const DECOY_PASSWORD: &str = "warden-decoy-password";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Trades valid credentials for a signed identity token.
pub struct LoginService<S> {
    store: S,
    hasher: PasswordHasher,
    tokens: Arc<Hs256TokenService>,
    roles: Arc<RoleTable>,
    ttl: Duration,
    /// Hash at the configured cost, verified against for unknown usernames so
    /// every failed lookup pays for one bcrypt run.
    decoy_hash: String,
}

impl<S: UserStore> LoginService<S> {
    pub fn new(
        store: S,
        hasher: PasswordHasher,
        tokens: Arc<Hs256TokenService>,
        roles: Arc<RoleTable>,
        ttl: Duration,
    ) -> Self {
        let decoy_hash = hasher.hash(DECOY_PASSWORD).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not prepare decoy hash");
            String::new()
        });

        Self {
            store,
            hasher,
            tokens,
            roles,
            ttl,
            decoy_hash,
        }
    }

    /// Unknown user, wrong password and deactivated account all fail the
    /// same way so the response does not reveal which usernames exist.
    pub fn authenticate(&self, credentials: &Credentials) -> DomainResult<IssuedToken> {
        let username = credentials.username.trim();
        if username.is_empty() || credentials.password.is_empty() {
            return Err(DomainError::validation("username and password are required"));
        }

        let Some(user) = self.store.find_by_username(username)? else {
            let _ = self.hasher.verify(&credentials.password, &self.decoy_hash);
            tracing::info!(username, "login failed: unknown user");
            return Err(DomainError::InvalidCredentials);
        };

        if !self.hasher.verify(&credentials.password, &user.password_hash) {
            tracing::info!(user = %user.id, "login failed: bad password");
            return Err(DomainError::InvalidCredentials);
        }

        if !user.active {
            tracing::info!(user = %user.id, "login failed: account inactive");
            return Err(DomainError::InvalidCredentials);
        }

        let identity = Identity {
            user_id: user.id,
            role_id: user.role_id,
            access_level: role_level(&self.roles, &user)?,
            company_id: user.company_id,
            location_id: user.location_id,
        };

        let issued = self
            .tokens
            .issue(&identity, self.ttl)
            .map_err(|e| DomainError::internal(e.to_string()))?;

        tracing::info!(user = %user.id, expires_at = %issued.expires_at, "login succeeded");
        Ok(issued)
    }
}
