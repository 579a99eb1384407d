//! Roles and the permissions they grant.

use std::fmt;

use crate::{auth::User, util_resp::FailureResponse};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Staff,
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Staff, Role::Viewer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|role| role.as_str() == s)
    }

    pub fn grants(self, permission: Permission) -> bool {
        match (self, permission) {
            (Role::Admin, _) => true,
            (Role::Staff, Permission::ViewData)
            | (Role::Staff, Permission::ManageSportingData) => true,
            (Role::Staff, _) => false,
            (Role::Viewer, Permission::ViewData) => true,
            (Role::Viewer, _) => false,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    ViewData,
    /// Tournaments, phases, teams, players, matches and results.
    ManageSportingData,
    ManageFinances,
    ManageUsers,
}

impl User {
    pub fn check_permission(
        &self,
        permission: Permission,
    ) -> Result<(), FailureResponse> {
        if self.role().grants(permission) {
            Ok(())
        } else {
            tracing::debug!(
                user = %self.id,
                ?permission,
                "permission denied"
            );
            Err(FailureResponse::Forbidden(()))
        }
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.role().grants(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_round_trip_through_strings() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn staff_cannot_touch_finances_or_users() {
        assert!(Role::Staff.grants(Permission::ManageSportingData));
        assert!(!Role::Staff.grants(Permission::ManageFinances));
        assert!(!Role::Staff.grants(Permission::ManageUsers));
        assert!(!Role::Viewer.grants(Permission::ManageSportingData));
        assert!(Role::Admin.grants(Permission::ManageUsers));
    }
}
