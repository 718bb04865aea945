//! Test doubles shared by the operation tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use warden_auth::{AccessLevel, Identity, PasswordHasher};
use warden_core::{CompanyId, LocationId, RoleId, UserId};

use crate::model::{NewUser, User, UserUpdate};
use crate::store::{StoreError, UserFilter, UserStore};

pub fn test_time(year: i32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap()
}

pub fn hasher() -> PasswordHasher {
    PasswordHasher::new(4)
}

/// Identity at a standard-table role (role id == access level).
pub fn identity(user: i64, level: i32, company: i64, location: i64) -> Identity {
    Identity {
        user_id: UserId::new(user),
        role_id: RoleId::new(level as i64),
        access_level: AccessLevel::new(level),
        company_id: CompanyId::new(company),
        location_id: LocationId::new(location),
    }
}

#[derive(Debug, Default)]
struct State {
    users: BTreeMap<UserId, User>,
    next_id: i64,
    calls: Vec<&'static str>,
}

/// In-process store that records every call it receives.
///
/// Timestamps are frozen at `now` so assertions can compare exact values;
/// `tick` moves the clock for `updated_at` checks.
#[derive(Debug)]
pub struct RecordingStore {
    state: Mutex<State>,
    now: Mutex<DateTime<Utc>>,
    fail_with: Mutex<Option<StoreError>>,
}

impl RecordingStore {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
            now: Mutex::new(now),
            fail_with: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn user(&self, id: UserId) -> Option<User> {
        self.state.lock().unwrap().users.get(&id).cloned()
    }

    pub fn tick(&self, to: DateTime<Utc>) {
        *self.now.lock().unwrap() = to;
    }

    /// Make the next call fail with `err`.
    pub fn fail_next(&self, err: StoreError) {
        *self.fail_with.lock().unwrap() = Some(err);
    }

    /// Insert a user directly, bypassing the service.
    pub fn seed(&self, user: NewUser) -> User {
        let mut state = self.state.lock().unwrap();
        let now = *self.now.lock().unwrap();
        let id = UserId::new(state.next_id);
        state.next_id += 1;
        let user = materialize(id, user, now);
        state.users.insert(id, user.clone());
        user
    }

    fn enter(&self, call: &'static str) -> Result<(), StoreError> {
        self.state.lock().unwrap().calls.push(call);
        match self.fail_with.lock().unwrap().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

fn materialize(id: UserId, user: NewUser, now: DateTime<Utc>) -> User {
    User {
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
    }
}

impl UserStore for RecordingStore {
    fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        self.enter("create_user")?;
        let now = *self.now.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        if state
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict("username or email already exists".into()));
        }
        let id = UserId::new(state.next_id);
        state.next_id += 1;
        let user = materialize(id, user, now);
        state.users.insert(id, user.clone());
        Ok(user)
    }

    fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        self.enter("get_user_by_id")?;
        self.state
            .lock()
            .unwrap()
            .users
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        self.enter("find_by_username")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn list_users(&self, filter: UserFilter) -> Result<Vec<User>, StoreError> {
        self.enter("list_users")?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .values()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect())
    }

    fn update_user_password(&self, id: UserId, password_hash: &str) -> Result<(), StoreError> {
        self.enter("update_user_password")?;
        let now = *self.now.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = now;
        Ok(())
    }

    fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User, StoreError> {
        self.enter("update_user")?;
        let now = *self.now.lock().unwrap();
        let mut state = self.state.lock().unwrap();
        if let Some(email) = &update.email
            && state.users.values().any(|u| u.id != id && &u.email == email)
        {
            return Err(StoreError::Conflict("email already exists".into()));
        }
        let user = state.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(email) = &update.email {
            user.email = email.clone();
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    fn delete_user(&self, id: UserId) -> Result<(), StoreError> {
        self.enter("delete_user")?;
        self.state
            .lock()
            .unwrap()
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}
