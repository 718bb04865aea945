//! `warden-core`: shared identifiers and the error taxonomy.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{CompanyId, LocationId, RoleId, UserId};
