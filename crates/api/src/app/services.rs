use std::sync::Arc;

use thiserror::Error;

use warden_accounts::{AccountService, LoginService, UserStore};
use warden_auth::{Hs256TokenService, RoleTable, TokenError, roles::SUPER_ADMIN};
use warden_core::{DomainError, DomainResult, RoleId};
use warden_infra::InMemoryUserStore;

use crate::settings::{Settings, SettingsError};

pub type SharedStore = Arc<dyn UserStore>;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("token service: {0}")]
    Token(#[from] TokenError),

    #[error("bootstrap account: {0}")]
    Bootstrap(#[from] DomainError),
}

/// Process-wide services shared by every handler.
///
/// Built once from validated [`Settings`]; nothing in here is mutated after
/// startup apart from the store's own rows.
pub struct AppServices {
    pub accounts: AccountService<SharedStore>,
    pub login: LoginService<SharedStore>,
    pub tokens: Arc<Hs256TokenService>,
}

/// Wire services over the in-memory store.
pub fn build_services(settings: &Settings) -> Result<AppServices, StartupError> {
    build_services_with_store(settings, Arc::new(InMemoryUserStore::new()))
}

pub fn build_services_with_store(
    settings: &Settings,
    store: SharedStore,
) -> Result<AppServices, StartupError> {
    settings.validate()?;

    let roles = Arc::new(settings.role_table().map_err(SettingsError::from)?);
    let tokens = Arc::new(Hs256TokenService::new(settings.auth.jwt_secret.as_bytes())?);
    let hasher = settings.hasher();

    let accounts = AccountService::new(store.clone(), hasher, roles.clone())
        .with_policy(settings.auth.password_policy);
    let login = LoginService::new(
        store,
        hasher,
        tokens.clone(),
        roles.clone(),
        settings.token_ttl()?,
    );

    let services = AppServices {
        accounts,
        login,
        tokens,
    };

    if let Some(bootstrap) = &settings.bootstrap {
        let role_id = super_admin_role(&roles)?;
        services.accounts.bootstrap(bootstrap.to_new_account(role_id))?;
    }

    Ok(services)
}

fn super_admin_role(roles: &RoleTable) -> DomainResult<RoleId> {
    roles
        .by_name(SUPER_ADMIN)
        .map(|role| role.id)
        .ok_or_else(|| DomainError::internal("role table has no super_admin role"))
}
