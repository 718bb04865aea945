//! Account/user operations.
//!
//! Every operation fails fast in the same order: structural validation, then
//! authorization, then persistence. A request that is malformed or forbidden
//! never reaches the store.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use warden_auth::{AccessLevel, Decision, HashError, Identity, PasswordHasher, Rbac, RoleTable};
use warden_core::{CompanyId, DomainError, DomainResult, UserId};

use crate::model::{NewAccount, PasswordChange, User, UserUpdate};
use crate::store::{UserFilter, UserStore};

/// Whether an admin resetting someone else's password must know the old one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PasswordChangePolicy {
    /// Admins skip the old-password check on accounts they manage: strictly
    /// lower roles in their own company, or anyone for a super-admin.
    /// Everything else, including one's own password, is checked.
    #[default]
    AdminOverride,
    /// The old password is checked for every change.
    AlwaysVerify,
}

impl PasswordChangePolicy {
    fn requires_old_password(self, manages_target: bool) -> bool {
        match self {
            PasswordChangePolicy::AlwaysVerify => true,
            PasswordChangePolicy::AdminOverride => !manages_target,
        }
    }
}

pub(crate) fn hash_error(err: HashError) -> DomainError {
    match err {
        HashError::InputTooLong { .. } => DomainError::validation(err.to_string()),
        HashError::Backend(msg) => DomainError::internal(msg),
    }
}

pub(crate) fn role_level(roles: &RoleTable, user: &User) -> DomainResult<AccessLevel> {
    roles.access_level(user.role_id).ok_or_else(|| {
        DomainError::internal(format!(
            "user {} references unknown role {}",
            user.id, user.role_id
        ))
    })
}

fn enforce(decision: Decision, caller: &Identity, action: &'static str) -> DomainResult<()> {
    decision.require().map_err(|err| {
        tracing::warn!(caller = %caller.user_id, action, reason = %err.0, "access denied");
        DomainError::from(err)
    })
}

/// Orchestrates hasher, RBAC engine and store for account mutations.
pub struct AccountService<S> {
    store: S,
    hasher: PasswordHasher,
    rbac: Rbac,
    roles: Arc<RoleTable>,
    policy: PasswordChangePolicy,
}

impl<S: UserStore> AccountService<S> {
    pub fn new(store: S, hasher: PasswordHasher, roles: Arc<RoleTable>) -> Self {
        Self {
            store,
            hasher,
            rbac: Rbac::new(roles.hierarchy()),
            roles,
            policy: PasswordChangePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: PasswordChangePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn create_account(&self, caller: &Identity, account: NewAccount) -> DomainResult<User> {
        account.validate()?;
        let target_level = self
            .roles
            .access_level(account.role_id)
            .ok_or_else(|| DomainError::validation(format!("unknown role {}", account.role_id)))?;

        enforce(
            self.rbac.check_create_account(
                caller,
                target_level,
                account.company_id,
                account.location_id,
            ),
            caller,
            "create_account",
        )?;

        let password_hash = self.hasher.hash(&account.password).map_err(hash_error)?;
        let user = self.store.create_user(account.into_new_user(password_hash))?;

        tracing::info!(
            caller = %caller.user_id,
            user = %user.id,
            role = %user.role_id,
            company = %user.company_id,
            "account created"
        );
        Ok(user)
    }

    pub fn change_password(
        &self,
        caller: &Identity,
        target: UserId,
        change: PasswordChange,
    ) -> DomainResult<()> {
        change.validate()?;
        enforce(
            self.rbac.check_self_or_admin(caller, target),
            caller,
            "change_password",
        )?;

        let user = self.store.get_user_by_id(target)?;
        let manages_target = caller.user_id != target
            && self.rbac.can_manage_account(
                caller,
                role_level(&self.roles, &user)?,
                user.company_id,
            );

        if self.policy.requires_old_password(manages_target)
            && !self.hasher.verify(&change.old_password, &user.password_hash)
        {
            tracing::warn!(caller = %caller.user_id, user = %target, "old password mismatch");
            return Err(DomainError::InvalidCredentials);
        }

        let password_hash = self.hasher.hash(&change.new_password).map_err(hash_error)?;
        self.store.update_user_password(target, &password_hash)?;

        tracing::info!(caller = %caller.user_id, user = %target, "password changed");
        Ok(())
    }

    /// Edit names or email. Users edit themselves; admins edit accounts
    /// they outrank in their own company, super-admins edit anyone.
    pub fn update_user(
        &self,
        caller: &Identity,
        target: UserId,
        update: UserUpdate,
    ) -> DomainResult<User> {
        update.validate()?;
        enforce(
            self.rbac.check_self_or_admin(caller, target),
            caller,
            "update_user",
        )?;

        let user = self.store.get_user_by_id(target)?;
        if caller.user_id != target {
            enforce(
                self.rbac.check_manage_account(
                    caller,
                    role_level(&self.roles, &user)?,
                    user.company_id,
                ),
                caller,
                "update_user",
            )?;
        }

        let updated = self.store.update_user(target, &update.normalized())?;

        tracing::info!(caller = %caller.user_id, user = %target, "profile updated");
        Ok(updated)
    }

    /// Delete a user whose role level and company the caller already knows.
    pub fn delete_account(
        &self,
        caller: &Identity,
        target: UserId,
        target_level: AccessLevel,
        target_company: CompanyId,
    ) -> DomainResult<()> {
        enforce(
            self.rbac
                .check_delete_account(caller, target_level, target_company),
            caller,
            "delete_account",
        )?;

        self.store.delete_user(target)?;

        tracing::info!(caller = %caller.user_id, user = %target, "account deleted");
        Ok(())
    }

    /// Load the target, then delete it through [`AccountService::delete_account`].
    pub fn delete_user(&self, caller: &Identity, target: UserId) -> DomainResult<()> {
        let user = self.store.get_user_by_id(target)?;
        let level = role_level(&self.roles, &user)?;
        self.delete_account(caller, user.id, level, user.company_id)
    }

    pub fn view_user(&self, caller: &Identity, target: UserId) -> DomainResult<User> {
        let user = self.store.get_user_by_id(target)?;
        enforce(
            self.rbac.check_view_account(caller, user.company_id),
            caller,
            "view_user",
        )?;
        Ok(user)
    }

    pub fn list_users(&self, caller: &Identity) -> DomainResult<Vec<User>> {
        let scope = self.rbac.list_scope(caller).map_err(|err| {
            tracing::warn!(caller = %caller.user_id, action = "list_users", reason = %err.0, "access denied");
            DomainError::from(err)
        })?;

        Ok(self.store.list_users(UserFilter::from(scope))?)
    }

    pub fn me(&self, caller: &Identity) -> DomainResult<User> {
        Ok(self.store.get_user_by_id(caller.user_id)?)
    }

    /// Create the first account at startup, bypassing RBAC.
    ///
    /// Does nothing when the username is already taken, so restarting against
    /// a persistent store is harmless.
    pub fn bootstrap(&self, account: NewAccount) -> DomainResult<Option<User>> {
        account.validate()?;
        if self.roles.get(account.role_id).is_none() {
            return Err(DomainError::validation(format!(
                "unknown role {}",
                account.role_id
            )));
        }
        if self.store.find_by_username(account.username.trim())?.is_some() {
            tracing::debug!(username = %account.username, "bootstrap account already present");
            return Ok(None);
        }

        let password_hash = self.hasher.hash(&account.password).map_err(hash_error)?;
        let user = self.store.create_user(account.into_new_user(password_hash))?;

        tracing::info!(user = %user.id, username = %user.username, "bootstrap account created");
        Ok(Some(user))
    }
}
