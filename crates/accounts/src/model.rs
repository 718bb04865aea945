//! Account records and operation inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::MAX_PASSWORD_BYTES;
use warden_core::{CompanyId, DomainError, DomainResult, LocationId, RoleId, UserId};

/// A persisted user account.
///
/// The password hash stays on the server: it is skipped on serialization so
/// no response body can ever carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub role_id: RoleId,
    pub company_id: CompanyId,
    pub location_id: LocationId,
    pub active: bool,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A user about to be inserted; the store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub role_id: RoleId,
    pub company_id: CompanyId,
    pub location_id: LocationId,
    pub active: bool,
    pub password_hash: String,
}

/// Account creation input as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub role_id: RoleId,
    pub company_id: CompanyId,
    pub location_id: LocationId,
}

impl NewAccount {
    /// Structural checks only; no authorization, no IO.
    pub fn validate(&self) -> DomainResult<()> {
        require_non_empty("first_name", &self.first_name)?;
        require_non_empty("last_name", &self.last_name)?;
        require_non_empty("username", &self.username)?;

        validate_email(&self.email)?;

        validate_new_password(&self.password, &self.password_confirm)
    }

    pub(crate) fn into_new_user(self, password_hash: String) -> NewUser {
        NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            username: self.username.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            role_id: self.role_id,
            company_id: self.company_id,
            location_id: self.location_id,
            active: true,
            password_hash,
        }
    }
}

/// Password change input.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PasswordChange {
    #[serde(default)]
    pub old_password: String,
    pub new_password: String,
    pub new_password_confirm: String,
}

impl PasswordChange {
    pub fn validate(&self) -> DomainResult<()> {
        validate_new_password(&self.new_password, &self.new_password_confirm)
    }
}

/// Profile update input. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserUpdate {
    pub fn validate(&self) -> DomainResult<()> {
        if self.first_name.is_none() && self.last_name.is_none() && self.email.is_none() {
            return Err(DomainError::validation("no fields to update"));
        }
        if let Some(first_name) = &self.first_name {
            require_non_empty("first_name", first_name)?;
        }
        if let Some(last_name) = &self.last_name {
            require_non_empty("last_name", last_name)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }

    /// Trimmed and lower-cased the same way [`NewAccount`] is on insert.
    pub(crate) fn normalized(self) -> Self {
        Self {
            first_name: self.first_name.map(|v| v.trim().to_string()),
            last_name: self.last_name.map(|v| v.trim().to_string()),
            email: self.email.map(|v| v.trim().to_lowercase()),
        }
    }
}

fn validate_email(email: &str) -> DomainResult<()> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(())
}

fn require_non_empty(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

fn validate_new_password(password: &str, confirm: &str) -> DomainResult<()> {
    if password.is_empty() {
        return Err(DomainError::validation("password cannot be empty"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(DomainError::validation(format!(
            "password must be at most {MAX_PASSWORD_BYTES} bytes"
        )));
    }
    if password != confirm {
        return Err(DomainError::validation("passwords do not match"));
    }
    Ok(())
}
