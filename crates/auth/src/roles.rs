use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use warden_core::RoleId;

pub const SUPER_ADMIN: &str = "super_admin";
pub const ADMIN: &str = "admin";
pub const COMPANY_ADMIN: &str = "company_admin";
pub const LOCATION_ADMIN: &str = "location_admin";
pub const USER: &str = "user";

/// Integer privilege rank of a role.
///
/// Lower value means more privileged (`1` is super-admin). There is
/// deliberately no `Ord` impl: comparisons go through [`AccessLevel::outranks`]
/// and [`AccessLevel::is_within`] so the inverted ordering can't be misread.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessLevel(i32);

impl AccessLevel {
    pub const fn new(level: i32) -> Self {
        Self(level)
    }

    pub const fn get(self) -> i32 {
        self.0
    }

    /// Strictly more privileged than `other`.
    pub const fn outranks(self, other: AccessLevel) -> bool {
        self.0 < other.0
    }

    /// At least as privileged as `threshold`.
    pub const fn is_within(self, threshold: AccessLevel) -> bool {
        self.0 <= threshold.0
    }
}

impl core::fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A configured role.
///
/// Roles are data, not types: the engine only ever reads `access_level`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub access_level: AccessLevel,
}

impl Role {
    pub fn new(id: i64, name: impl Into<String>, access_level: i32) -> Self {
        Self {
            id: RoleId::new(id),
            name: name.into(),
            access_level: AccessLevel::new(access_level),
        }
    }
}

/// Tier thresholds the RBAC engine compares callers against.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RoleHierarchy {
    pub super_admin: AccessLevel,
    pub admin: AccessLevel,
    pub company_admin: AccessLevel,
    pub location_admin: AccessLevel,
}

impl RoleHierarchy {
    pub const STANDARD: RoleHierarchy = RoleHierarchy {
        super_admin: AccessLevel::new(1),
        admin: AccessLevel::new(2),
        company_admin: AccessLevel::new(3),
        location_admin: AccessLevel::new(4),
    };
}

impl Default for RoleHierarchy {
    fn default() -> Self {
        Self::STANDARD
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleConfigError {
    #[error("role table is missing required role '{0}'")]
    MissingRole(&'static str),

    #[error("duplicate role id {0}")]
    DuplicateId(RoleId),

    #[error("duplicate role name '{0}'")]
    DuplicateName(String),

    #[error("tier roles must have strictly increasing access levels ({0})")]
    UnorderedTiers(String),
}

/// The process-wide role table: role id → access level, plus tier thresholds.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTable {
    roles: Vec<Role>,
    hierarchy: RoleHierarchy,
}

impl RoleTable {
    /// Validate a configured role list and derive the tier thresholds from the
    /// roles named `super_admin`, `admin`, `company_admin` and `location_admin`.
    pub fn new(roles: Vec<Role>) -> Result<Self, RoleConfigError> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for role in &roles {
            if !ids.insert(role.id) {
                return Err(RoleConfigError::DuplicateId(role.id));
            }
            if !names.insert(role.name.as_str()) {
                return Err(RoleConfigError::DuplicateName(role.name.clone()));
            }
        }

        let level_of = |name: &'static str| {
            roles
                .iter()
                .find(|r| r.name == name)
                .map(|r| r.access_level)
                .ok_or(RoleConfigError::MissingRole(name))
        };

        let hierarchy = RoleHierarchy {
            super_admin: level_of(SUPER_ADMIN)?,
            admin: level_of(ADMIN)?,
            company_admin: level_of(COMPANY_ADMIN)?,
            location_admin: level_of(LOCATION_ADMIN)?,
        };

        let ordered = hierarchy.super_admin.outranks(hierarchy.admin)
            && hierarchy.admin.outranks(hierarchy.company_admin)
            && hierarchy.company_admin.outranks(hierarchy.location_admin);
        if !ordered {
            return Err(RoleConfigError::UnorderedTiers(format!(
                "{SUPER_ADMIN}={}, {ADMIN}={}, {COMPANY_ADMIN}={}, {LOCATION_ADMIN}={}",
                hierarchy.super_admin,
                hierarchy.admin,
                hierarchy.company_admin,
                hierarchy.location_admin
            )));
        }

        Ok(Self { roles, hierarchy })
    }

    /// The built-in five-role table.
    pub fn standard() -> Self {
        Self {
            roles: standard_roles(),
            hierarchy: RoleHierarchy::STANDARD,
        }
    }

    pub fn get(&self, id: RoleId) -> Option<&Role> {
        self.roles.iter().find(|r| r.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&Role> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn access_level(&self, id: RoleId) -> Option<AccessLevel> {
        self.get(id).map(|r| r.access_level)
    }

    pub fn hierarchy(&self) -> RoleHierarchy {
        self.hierarchy
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::standard()
    }
}

pub fn standard_roles() -> Vec<Role> {
    vec![
        Role::new(1, SUPER_ADMIN, 1),
        Role::new(2, ADMIN, 2),
        Role::new(3, COMPANY_ADMIN, 3),
        Role::new(4, LOCATION_ADMIN, 4),
        Role::new(5, USER, 5),
    ]
}
