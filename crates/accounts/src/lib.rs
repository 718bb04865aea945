//! `warden-accounts`: account and user operations.
//!
//! Orchestrates the credential hasher and the RBAC engine from `warden-auth`
//! over a [`UserStore`] collaborator. Operations take an already resolved
//! [`warden_auth::Identity`]; transport concerns live in `warden-api`.

pub mod login;
pub mod model;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

pub use login::{Credentials, LoginService};
pub use model::{NewAccount, NewUser, PasswordChange, User, UserUpdate};
pub use service::{AccountService, PasswordChangePolicy};
pub use store::{StoreError, UserFilter, UserStore};
