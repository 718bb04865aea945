//! RBAC decision engine.
//!
//! Every decision is a pure function of the caller identity, the target's
//! attributes and the configured tier thresholds:
//! - No IO
//! - No panics
//! - No state beyond the read-only hierarchy
//!
//! Decisions are written as exhaustive matches with explicit deny arms, so a
//! combination nobody thought about fails to compile instead of being allowed.

use serde::Serialize;
use thiserror::Error;

use warden_core::{CompanyId, DomainError, LocationId, UserId};

use crate::identity::Identity;
use crate::roles::{AccessLevel, RoleHierarchy};

/// A caller's band in the role hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tier {
    SuperAdmin,
    Admin,
    CompanyAdmin,
    LocationAdmin,
    Member,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    /// Target role is not strictly below the caller's.
    PrivilegeEscalation,
    /// Target lives in another company.
    CompanyScope,
    /// Target lives in another location and the caller is location-bound.
    LocationScope,
    /// Caller is acting on someone else without admin rights.
    NotOwner,
    /// Caller's tier grants no access to the action at all.
    InsufficientRole,
}

impl DenialKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DenialKind::PrivilegeEscalation => "privilege escalation",
            DenialKind::CompanyScope => "outside caller's company",
            DenialKind::LocationScope => "outside caller's location",
            DenialKind::NotOwner => "not the account owner",
            DenialKind::InsufficientRole => "insufficient role",
        }
    }
}

impl core::fmt::Display for DenialKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("forbidden: {0}")]
pub struct AuthzError(pub DenialKind);

impl From<AuthzError> for DomainError {
    fn from(err: AuthzError) -> Self {
        DomainError::forbidden(err.0.as_str())
    }
}

/// Outcome of a single RBAC check.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenialKind),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn require(self) -> Result<(), AuthzError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(kind) => Err(AuthzError(kind)),
        }
    }
}

/// Which users a caller may enumerate.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ListScope {
    All,
    Company(CompanyId),
    Location(CompanyId, LocationId),
}

/// The decision engine. Cheap to copy; share it freely across requests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Rbac {
    hierarchy: RoleHierarchy,
}

impl Rbac {
    pub fn new(hierarchy: RoleHierarchy) -> Self {
        Self { hierarchy }
    }

    pub fn hierarchy(&self) -> RoleHierarchy {
        self.hierarchy
    }

    pub fn tier(&self, level: AccessLevel) -> Tier {
        let h = &self.hierarchy;
        if level.is_within(h.super_admin) {
            Tier::SuperAdmin
        } else if level.is_within(h.admin) {
            Tier::Admin
        } else if level.is_within(h.company_admin) {
            Tier::CompanyAdmin
        } else if level.is_within(h.location_admin) {
            Tier::LocationAdmin
        } else {
            Tier::Member
        }
    }

    /// Super-admins are unrestricted. Everyone else may only create roles
    /// strictly below their own, inside their own company; admins and company
    /// admins may pick any location, lower tiers only their own.
    pub fn check_create_account(
        &self,
        caller: &Identity,
        target_level: AccessLevel,
        target_company: CompanyId,
        target_location: LocationId,
    ) -> Decision {
        let tier = self.tier(caller.access_level);
        let outranks = caller.access_level.outranks(target_level);
        let same_company = caller.company_id == target_company;
        let same_location = caller.location_id == target_location;

        match (tier, outranks, same_company, same_location) {
            (Tier::SuperAdmin, _, _, _) => Decision::Allow,
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                false,
                _,
                _,
            ) => Decision::Deny(DenialKind::PrivilegeEscalation),
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                true,
                false,
                _,
            ) => Decision::Deny(DenialKind::CompanyScope),
            (Tier::Admin | Tier::CompanyAdmin, true, true, _) => Decision::Allow,
            (Tier::LocationAdmin | Tier::Member, true, true, true) => Decision::Allow,
            (Tier::LocationAdmin | Tier::Member, true, true, false) => {
                Decision::Deny(DenialKind::LocationScope)
            }
        }
    }

    pub fn can_create_account(
        &self,
        caller: &Identity,
        target_level: AccessLevel,
        target_company: CompanyId,
        target_location: LocationId,
    ) -> bool {
        self.check_create_account(caller, target_level, target_company, target_location)
            .is_allowed()
    }

    pub fn check_view_account(&self, caller: &Identity, target_company: CompanyId) -> Decision {
        let tier = self.tier(caller.access_level);
        let same_company = caller.company_id == target_company;

        match (tier, same_company) {
            (Tier::SuperAdmin, _) => Decision::Allow,
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                true,
            ) => Decision::Allow,
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                false,
            ) => Decision::Deny(DenialKind::CompanyScope),
        }
    }

    pub fn can_view_account(&self, caller: &Identity, target_company: CompanyId) -> bool {
        self.check_view_account(caller, target_company).is_allowed()
    }

    pub fn check_delete_account(
        &self,
        caller: &Identity,
        target_level: AccessLevel,
        target_company: CompanyId,
    ) -> Decision {
        self.check_manage_account(caller, target_level, target_company)
    }

    /// Acting on another account's credentials or profile: super-admins
    /// always, everyone else only on strictly lower roles in their company.
    pub fn check_manage_account(
        &self,
        caller: &Identity,
        target_level: AccessLevel,
        target_company: CompanyId,
    ) -> Decision {
        let tier = self.tier(caller.access_level);
        let outranks = caller.access_level.outranks(target_level);
        let same_company = caller.company_id == target_company;

        match (tier, outranks, same_company) {
            (Tier::SuperAdmin, _, _) => Decision::Allow,
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                false,
                _,
            ) => Decision::Deny(DenialKind::PrivilegeEscalation),
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                true,
                false,
            ) => Decision::Deny(DenialKind::CompanyScope),
            (
                Tier::Admin | Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member,
                true,
                true,
            ) => Decision::Allow,
        }
    }

    pub fn can_delete_account(
        &self,
        caller: &Identity,
        target_level: AccessLevel,
        target_company: CompanyId,
    ) -> bool {
        self.check_delete_account(caller, target_level, target_company)
            .is_allowed()
    }

    pub fn can_manage_account(
        &self,
        caller: &Identity,
        target_level: AccessLevel,
        target_company: CompanyId,
    ) -> bool {
        self.check_manage_account(caller, target_level, target_company)
            .is_allowed()
    }

    /// A user may always act on themselves; admins and above may act on anyone.
    pub fn check_self_or_admin(&self, caller: &Identity, target_user: UserId) -> Decision {
        let tier = self.tier(caller.access_level);
        let is_self = caller.user_id == target_user;

        match (tier, is_self) {
            (_, true) => Decision::Allow,
            (Tier::SuperAdmin | Tier::Admin, false) => Decision::Allow,
            (Tier::CompanyAdmin | Tier::LocationAdmin | Tier::Member, false) => {
                Decision::Deny(DenialKind::NotOwner)
            }
        }
    }

    pub fn enforce_self_or_admin(&self, caller: &Identity, target_user: UserId) -> bool {
        self.check_self_or_admin(caller, target_user).is_allowed()
    }

    pub fn list_scope(&self, caller: &Identity) -> Result<ListScope, AuthzError> {
        match self.tier(caller.access_level) {
            Tier::SuperAdmin | Tier::Admin => Ok(ListScope::All),
            Tier::CompanyAdmin => Ok(ListScope::Company(caller.company_id)),
            Tier::LocationAdmin => Ok(ListScope::Location(caller.company_id, caller.location_id)),
            Tier::Member => Err(AuthzError(DenialKind::InsufficientRole)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::RoleId;

    const SUPER_ADMIN: i32 = 1;
    const ADMIN: i32 = 2;
    const COMPANY_ADMIN: i32 = 3;
    const LOCATION_ADMIN: i32 = 4;
    const USER: i32 = 5;

    fn caller(user: i64, level: i32, company: i64, location: i64) -> Identity {
        Identity {
            user_id: UserId::new(user),
            role_id: RoleId::new(level as i64),
            access_level: AccessLevel::new(level),
            company_id: CompanyId::new(company),
            location_id: LocationId::new(location),
        }
    }

    fn lvl(level: i32) -> AccessLevel {
        AccessLevel::new(level)
    }

    fn co(id: i64) -> CompanyId {
        CompanyId::new(id)
    }

    fn loc(id: i64) -> LocationId {
        LocationId::new(id)
    }

    #[test]
    fn tiers_follow_thresholds() {
        let rbac = Rbac::default();
        assert_eq!(rbac.tier(lvl(SUPER_ADMIN)), Tier::SuperAdmin);
        assert_eq!(rbac.tier(lvl(ADMIN)), Tier::Admin);
        assert_eq!(rbac.tier(lvl(COMPANY_ADMIN)), Tier::CompanyAdmin);
        assert_eq!(rbac.tier(lvl(LOCATION_ADMIN)), Tier::LocationAdmin);
        assert_eq!(rbac.tier(lvl(USER)), Tier::Member);
        assert_eq!(rbac.tier(lvl(0)), Tier::SuperAdmin);
        assert_eq!(rbac.tier(lvl(42)), Tier::Member);
    }

    #[test]
    fn super_admin_creates_anything_anywhere() {
        let rbac = Rbac::default();
        let root = caller(1, SUPER_ADMIN, 1, 1);
        for level in [SUPER_ADMIN, ADMIN, USER] {
            assert!(rbac.can_create_account(&root, lvl(level), co(99), loc(42)));
        }
    }

    #[test]
    fn manager_cannot_create_a_peer() {
        let rbac = Rbac::default();
        let manager = caller(2, LOCATION_ADMIN, 1, 2);
        assert_eq!(
            rbac.check_create_account(&manager, lvl(LOCATION_ADMIN), co(1), loc(2)),
            Decision::Deny(DenialKind::PrivilegeEscalation)
        );
        assert!(!rbac.can_create_account(&manager, lvl(COMPANY_ADMIN), co(1), loc(2)));
    }

    #[test]
    fn manager_creates_subordinates_only_in_own_location() {
        let rbac = Rbac::default();
        let manager = caller(2, LOCATION_ADMIN, 1, 2);
        assert!(rbac.can_create_account(&manager, lvl(USER), co(1), loc(2)));
        assert_eq!(
            rbac.check_create_account(&manager, lvl(USER), co(1), loc(3)),
            Decision::Deny(DenialKind::LocationScope)
        );
    }

    #[test]
    fn company_admin_creates_anywhere_in_own_company() {
        let rbac = Rbac::default();
        let company_admin = caller(3, COMPANY_ADMIN, 1, 1);
        assert!(rbac.can_create_account(&company_admin, lvl(USER), co(1), loc(77)));
        assert!(rbac.can_create_account(&company_admin, lvl(LOCATION_ADMIN), co(1), loc(2)));
        assert_eq!(
            rbac.check_create_account(&company_admin, lvl(USER), co(2), loc(77)),
            Decision::Deny(DenialKind::CompanyScope)
        );
    }

    #[test]
    fn admin_is_company_scoped() {
        let rbac = Rbac::default();
        let admin = caller(4, ADMIN, 1, 1);
        assert!(rbac.can_create_account(&admin, lvl(COMPANY_ADMIN), co(1), loc(5)));
        assert!(!rbac.can_create_account(&admin, lvl(COMPANY_ADMIN), co(2), loc(5)));
        assert!(!rbac.can_create_account(&admin, lvl(ADMIN), co(1), loc(1)));
    }

    #[test]
    fn view_requires_same_company_unless_super_admin() {
        let rbac = Rbac::default();
        assert!(rbac.can_view_account(&caller(1, SUPER_ADMIN, 1, 1), co(9)));
        assert!(rbac.can_view_account(&caller(5, USER, 9, 1), co(9)));
        assert_eq!(
            rbac.check_view_account(&caller(4, ADMIN, 1, 1), co(9)),
            Decision::Deny(DenialKind::CompanyScope)
        );
    }

    #[test]
    fn delete_requires_rank_and_company() {
        let rbac = Rbac::default();
        let company_admin = caller(3, COMPANY_ADMIN, 1, 1);
        assert!(rbac.can_delete_account(&company_admin, lvl(USER), co(1)));
        assert!(!rbac.can_delete_account(&company_admin, lvl(COMPANY_ADMIN), co(1)));
        assert!(!rbac.can_delete_account(&company_admin, lvl(USER), co(2)));
        assert!(rbac.can_delete_account(&caller(1, SUPER_ADMIN, 1, 1), lvl(SUPER_ADMIN), co(2)));
    }

    #[test]
    fn admin_cannot_manage_super_admin_or_peers() {
        let rbac = Rbac::default();
        let admin = caller(4, ADMIN, 1, 1);
        assert_eq!(
            rbac.check_manage_account(&admin, lvl(SUPER_ADMIN), co(2)),
            Decision::Deny(DenialKind::PrivilegeEscalation)
        );
        assert_eq!(
            rbac.check_manage_account(&admin, lvl(ADMIN), co(1)),
            Decision::Deny(DenialKind::PrivilegeEscalation)
        );
        assert_eq!(
            rbac.check_manage_account(&admin, lvl(USER), co(2)),
            Decision::Deny(DenialKind::CompanyScope)
        );
        assert!(rbac.can_manage_account(&admin, lvl(USER), co(1)));
    }

    #[test]
    fn self_or_admin() {
        let rbac = Rbac::default();
        let user = caller(10, USER, 1, 1);
        assert!(rbac.enforce_self_or_admin(&user, UserId::new(10)));
        assert_eq!(
            rbac.check_self_or_admin(&user, UserId::new(11)),
            Decision::Deny(DenialKind::NotOwner)
        );
        assert!(!rbac.enforce_self_or_admin(&caller(3, COMPANY_ADMIN, 1, 1), UserId::new(11)));
        assert!(rbac.enforce_self_or_admin(&caller(2, ADMIN, 1, 1), UserId::new(11)));
        assert!(rbac.enforce_self_or_admin(&caller(1, SUPER_ADMIN, 1, 1), UserId::new(11)));
    }

    #[test]
    fn list_scope_narrows_with_tier() {
        let rbac = Rbac::default();
        assert_eq!(rbac.list_scope(&caller(1, SUPER_ADMIN, 1, 1)), Ok(ListScope::All));
        assert_eq!(rbac.list_scope(&caller(2, ADMIN, 1, 1)), Ok(ListScope::All));
        assert_eq!(
            rbac.list_scope(&caller(3, COMPANY_ADMIN, 4, 1)),
            Ok(ListScope::Company(co(4)))
        );
        assert_eq!(
            rbac.list_scope(&caller(4, LOCATION_ADMIN, 4, 6)),
            Ok(ListScope::Location(co(4), loc(6)))
        );
        assert_eq!(
            rbac.list_scope(&caller(5, USER, 4, 6)),
            Err(AuthzError(DenialKind::InsufficientRole))
        );
    }

    #[test]
    fn denial_maps_to_forbidden() {
        let err = Decision::Deny(DenialKind::CompanyScope).require().unwrap_err();
        assert_eq!(
            DomainError::from(err),
            DomainError::forbidden("outside caller's company")
        );
        assert!(Decision::Allow.require().is_ok());
    }

    #[test]
    fn custom_hierarchy_is_respected() {
        let rbac = Rbac::new(RoleHierarchy {
            super_admin: lvl(100),
            admin: lvl(110),
            company_admin: lvl(120),
            location_admin: lvl(130),
        });
        let company_admin = caller(3, 120, 1, 1);
        assert_eq!(rbac.tier(lvl(120)), Tier::CompanyAdmin);
        assert!(rbac.can_create_account(&company_admin, lvl(200), co(1), loc(8)));
        assert!(!rbac.can_create_account(&company_admin, lvl(110), co(1), loc(8)));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 512,
                ..ProptestConfig::default()
            })]

            /// Property: super-admins are never refused account creation.
            #[test]
            fn super_admin_always_creates(
                target in 0i32..10,
                company in 0i64..5,
                location in 0i64..5,
            ) {
                let rbac = Rbac::default();
                let root = caller(1, SUPER_ADMIN, 0, 0);
                prop_assert!(rbac.can_create_account(&root, lvl(target), co(company), loc(location)));
            }

            /// Property: below super-admin, nobody creates or deletes at or above their own level.
            #[test]
            fn no_elevation_below_super_admin(
                caller_level in ADMIN..=7,
                target_level in 0i32..=7,
                company in 0i64..3,
                location in 0i64..3,
            ) {
                let rbac = Rbac::default();
                let actor = caller(9, caller_level, company, location);
                let allowed_create = rbac.can_create_account(&actor, lvl(target_level), co(company), loc(location));
                let allowed_delete = rbac.can_delete_account(&actor, lvl(target_level), co(company));

                if target_level <= caller_level {
                    prop_assert!(!allowed_create);
                    prop_assert!(!allowed_delete);
                }
            }

            /// Property: cross-company creation is reserved for super-admins.
            #[test]
            fn cross_company_only_for_super_admin(
                caller_level in 0i32..=7,
                target_level in 0i32..=7,
                caller_company in 0i64..4,
                target_company in 0i64..4,
            ) {
                prop_assume!(caller_company != target_company);
                let rbac = Rbac::default();
                let actor = caller(9, caller_level, caller_company, 0);
                let allowed = rbac.can_create_account(&actor, lvl(target_level), co(target_company), loc(0));
                prop_assert_eq!(allowed, rbac.tier(lvl(caller_level)) == Tier::SuperAdmin);
            }

            /// Property: decisions are deterministic.
            #[test]
            fn decisions_are_pure(
                caller_level in 0i32..=7,
                target_level in 0i32..=7,
                company in 0i64..3,
                location in 0i64..3,
            ) {
                let rbac = Rbac::default();
                let actor = caller(9, caller_level, 1, 1);
                let a = rbac.check_create_account(&actor, lvl(target_level), co(company), loc(location));
                let b = rbac.check_create_account(&actor, lvl(target_level), co(company), loc(location));
                prop_assert_eq!(a, b);
            }
        }
    }
}
