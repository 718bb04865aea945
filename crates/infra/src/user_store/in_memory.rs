use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};

use warden_accounts::{NewUser, StoreError, User, UserFilter, UserStore, UserUpdate};
use warden_core::UserId;

#[derive(Debug)]
struct Table {
    rows: BTreeMap<UserId, User>,
    next_id: i64,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl Table {
    fn conflict(&self, user: &NewUser) -> Option<StoreError> {
        self.rows.values().find_map(|existing| {
            if existing.username == user.username {
                Some(StoreError::Conflict(format!(
                    "username '{}' already exists",
                    user.username
                )))
            } else if existing.email == user.email {
                Some(StoreError::Conflict(format!(
                    "email '{}' already exists",
                    user.email
                )))
            } else {
                None
            }
        })
    }
}

/// In-memory user table.
///
/// Intended for tests/dev. Ids are assigned sequentially from 1 and never
/// reused after a delete.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: RwLock<Table>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("lock poisoned".to_string())
    }
}

// `updated_at` must move forward even when two writes land on the same clock tick.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl UserStore for InMemoryUserStore {
    fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut table = self.table.write().map_err(|_| Self::poisoned())?;

        if let Some(err) = table.conflict(&user) {
            return Err(err);
        }

        let id = UserId::new(table.next_id);
        table.next_id += 1;

        let now = Utc::now();
        let stored = User {
            id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            role_id: user.role_id,
            company_id: user.company_id,
            location_id: user.location_id,
            active: user.active,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        table.rows.insert(id, stored.clone());

        tracing::debug!(user = %id, "user row inserted");
        Ok(stored)
    }

    fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let table = self.table.read().map_err(|_| Self::poisoned())?;
        table.rows.get(&id).cloned().ok_or(StoreError::NotFound)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let table = self.table.read().map_err(|_| Self::poisoned())?;
        Ok(table
            .rows
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, StoreError> {
        let table = self.table.read().map_err(|_| Self::poisoned())?;
        Ok(table
            .rows
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    fn update_user_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| Self::poisoned())?;
        let row = table.rows.get_mut(&id).ok_or(StoreError::NotFound)?;

        row.password_hash = password_hash.to_string();
        row.updated_at = next_timestamp(row.updated_at);
        Ok(())
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, StoreError> {
        let mut table = self.table.write().map_err(|_| Self::poisoned())?;

        if let Some(email) = &update.email
            && table.rows.values().any(|u| u.id != id && &u.email == email)
        {
            return Err(StoreError::Conflict(format!("email '{email}' already exists")));
        }

        let row = table.rows.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(first_name) = &update.first_name {
            row.first_name.clone_from(first_name);
        }
        if let Some(last_name) = &update.last_name {
            row.last_name.clone_from(last_name);
        }
        if let Some(email) = &update.email {
            row.email.clone_from(email);
        }
        row.updated_at = next_timestamp(row.updated_at);

        tracing::debug!(user = %id, "user row updated");
        Ok(row.clone())
    }

    fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        let mut table = self.table.write().map_err(|_| Self::poisoned())?;
        table
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
