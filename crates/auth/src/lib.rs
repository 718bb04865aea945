//! `warden-auth`: pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage: it hashes
//! credentials, signs and verifies identity tokens, and answers RBAC questions.

pub mod claims;
pub mod identity;
pub mod password;
pub mod rbac;
pub mod roles;
pub mod token;

pub use claims::{TokenClaims, validate_claims};
pub use identity::{AuthnError, Identity, extract_bearer, resolve};
pub use password::{HashError, MAX_PASSWORD_BYTES, PasswordHasher};
pub use rbac::{AuthzError, Decision, DenialKind, ListScope, Rbac, Tier};
pub use roles::{AccessLevel, Role, RoleConfigError, RoleHierarchy, RoleTable};
pub use token::{Hs256TokenService, IssuedToken, TokenError, TokenValidator};
