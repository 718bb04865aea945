//! Process settings.
//!
//! Layered with the `config` crate, later layers winning:
//! 1. built-in defaults (`config/default.toml`, compiled in)
//! 2. an optional TOML file (`$WARDEN_CONFIG`, default `./warden.toml`)
//! 3. `WARDEN__SECTION__KEY` environment variables
//!
//! Settings are validated once and then shared read-only.

use std::net::SocketAddr;
use std::path::Path;

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use warden_accounts::{NewAccount, PasswordChangePolicy};
use warden_auth::{PasswordHasher, Role, RoleConfigError, RoleTable};
use warden_core::{CompanyId, LocationId, RoleId};
use warden_observability::LogSettings;

const DEFAULT_CONFIG_TOML: &str = include_str!("../config/default.toml");

pub const CONFIG_PATH_ENV: &str = "WARDEN_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "warden.toml";
const ENV_PREFIX: &str = "WARDEN";

/// Signing key used when none is configured. Never use outside development.
pub const DEV_JWT_SECRET: &str = "dev-secret";

/// Longest accepted token lifetime: 30 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("server.bind '{0}' is not a socket address")]
    InvalidBind(String),

    #[error("auth.token_ttl_secs must be within 1..={max} (got {0})", max = MAX_TOKEN_TTL_SECS)]
    InvalidTtl(i64),

    #[error("auth.bcrypt_cost must be within {min}..={max} (got {got})")]
    InvalidCost { got: u32, min: u32, max: u32 },

    #[error("invalid role table: {0}")]
    Roles(#[from] RoleConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthSettings {
    /// HS256 signing key. Empty means unset.
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub password_policy: PasswordChangePolicy,
}

/// Initial super-admin created at startup when absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BootstrapAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default = "default_first_name")]
    pub first_name: String,
    #[serde(default = "default_last_name")]
    pub last_name: String,
    #[serde(default = "default_scope_id")]
    pub company_id: CompanyId,
    #[serde(default = "default_scope_id")]
    pub location_id: LocationId,
}

fn default_first_name() -> String {
    "System".to_string()
}

fn default_last_name() -> String {
    "Administrator".to_string()
}

fn default_scope_id<T: From<i64>>() -> T {
    T::from(1)
}

impl BootstrapAccount {
    pub fn to_new_account(&self, role_id: RoleId) -> NewAccount {
        NewAccount {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            password_confirm: self.password.clone(),
            role_id,
            company_id: self.company_id,
            location_id: self.location_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub log: LogSettings,
    pub auth: AuthSettings,
    pub roles: Vec<Role>,
    #[serde(default)]
    pub bootstrap: Option<BootstrapAccount>,
}

impl Settings {
    /// Load from defaults, `$WARDEN_CONFIG` (or `./warden.toml`) and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml))
            .add_source(File::from(path).required(false))
            .add_source(env_source())
            .build()?;

        Self::from_config(config)
    }

    /// Defaults overlaid with a TOML document. Ignores the environment.
    pub fn from_toml(overrides: &str) -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG_TOML, FileFormat::Toml))
            .add_source(File::from_str(overrides, FileFormat::Toml))
            .build()?;

        Self::from_config(config)
    }

    fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.bind_addr()?;

        self.token_ttl()?;

        let cost = self.auth.bcrypt_cost;
        if !(bcrypt_bounds::MIN..=bcrypt_bounds::MAX).contains(&cost) {
            return Err(SettingsError::InvalidCost {
                got: cost,
                min: bcrypt_bounds::MIN,
                max: bcrypt_bounds::MAX,
            });
        }

        self.role_table()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.server
            .bind
            .parse()
            .map_err(|_| SettingsError::InvalidBind(self.server.bind.clone()))
    }

    pub fn role_table(&self) -> Result<RoleTable, RoleConfigError> {
        RoleTable::new(self.roles.clone())
    }

    pub fn token_ttl(&self) -> Result<chrono::Duration, SettingsError> {
        let secs = self.auth.token_ttl_secs;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&secs) {
            return Err(SettingsError::InvalidTtl(secs));
        }
        chrono::Duration::try_seconds(secs).ok_or(SettingsError::InvalidTtl(secs))
    }

    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::new(self.auth.bcrypt_cost)
    }

    /// True when no signing key is configured.
    pub fn jwt_secret_missing(&self) -> bool {
        self.auth.jwt_secret.trim().is_empty()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

// bcrypt accepts costs 4 through 31.
mod bcrypt_bounds {
    pub const MIN: u32 = 4;
    pub const MAX: u32 = 31;
}
