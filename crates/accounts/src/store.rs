use std::sync::Arc;

use thiserror::Error;

use warden_auth::ListScope;
use warden_core::{CompanyId, DomainError, LocationId, UserId};

use crate::model::{NewUser, User, UserUpdate};

/// Persistence failure as reported by a [`UserStore`].
///
/// These are **infrastructure errors**; operations fold them into
/// [`DomainError`] without retrying.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("uniqueness violation: {0}")]
    Conflict(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => DomainError::NotFound,
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Backend(msg) => DomainError::Store(msg),
        }
    }
}

/// Optional company/location narrowing for [`UserStore::list_users`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct UserFilter {
    pub company_id: Option<CompanyId>,
    pub location_id: Option<LocationId>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        self.company_id.is_none_or(|c| c == user.company_id)
            && self.location_id.is_none_or(|l| l == user.location_id)
    }
}

impl From<ListScope> for UserFilter {
    fn from(scope: ListScope) -> Self {
        match scope {
            ListScope::All => UserFilter::default(),
            ListScope::Company(company_id) => UserFilter {
                company_id: Some(company_id),
                location_id: None,
            },
            ListScope::Location(company_id, location_id) => UserFilter {
                company_id: Some(company_id),
                location_id: Some(location_id),
            },
        }
    }
}

/// User persistence collaborator.
///
/// Calls are blocking. Implementations must:
/// - assign `id`, `created_at` and `updated_at` on create
/// - reject duplicate usernames/emails with [`StoreError::Conflict`]
/// - advance `updated_at` on every password or profile update
/// - report missing ids with [`StoreError::NotFound`]
pub trait UserStore: Send + Sync {
    fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError>;

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Users matching `filter`, ordered by id.
    fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, StoreError>;

    fn update_user_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError>;

    /// Apply the present fields of `update` and return the stored record.
    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, StoreError>;

    fn delete_user(&self, id: UserId) -> Result<(), StoreError>;
}

impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        (**self).create_user(user)
    }

    fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        (**self).get_user_by_id(id)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        (**self).find_by_username(username)
    }

    fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, StoreError> {
        (**self).list_users(filter)
    }

    fn update_user_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        (**self).update_user_password(id, password_hash)
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, StoreError> {
        (**self).update_user(id, update)
    }

    fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        (**self).delete_user(id)
    }
}
