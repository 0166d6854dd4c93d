//! Static role and permission catalog.
//!
//! Both enums are closed: adding a role means extending [`permissions_for_role`]
//! and [`Role::access_scope`], and the compiler points at every other match
//! that needs the new arm.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
}

/// How far a role's grants reach over test records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessScope {
    /// Grants apply to every record.
    Unrestricted,
    /// Grants apply only to records the principal manages.
    Owned,
}

impl Role {
    /// Catalog order; the sync walks roles in this order.
    pub const ALL: [Role; 2] = [Role::Admin, Role::Manager];

    pub fn name(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
        }
    }

    pub fn permissions(self) -> &'static [Permission] {
        permissions_for_role(self)
    }

    pub fn access_scope(self) -> AccessScope {
        match self {
            Role::Admin => AccessScope::Unrestricted,
            Role::Manager => AccessScope::Owned,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.name() == s)
            .ok_or_else(|| AppError::UnknownRole(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateUser,
    UpdateUser,
    DeleteUser,
    ViewUser,
    ViewUsers,
    CreateTest,
    UpdateTest,
    UpdateTestRate,
    DeleteTest,
    ViewTest,
    ViewTests,
}

impl Permission {
    pub const ALL: [Permission; 11] = [
        Permission::CreateUser,
        Permission::UpdateUser,
        Permission::DeleteUser,
        Permission::ViewUser,
        Permission::ViewUsers,
        Permission::CreateTest,
        Permission::UpdateTest,
        Permission::UpdateTestRate,
        Permission::DeleteTest,
        Permission::ViewTest,
        Permission::ViewTests,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Permission::CreateUser => "create_user",
            Permission::UpdateUser => "update_user",
            Permission::DeleteUser => "delete_user",
            Permission::ViewUser => "view_user",
            Permission::ViewUsers => "view_users",
            Permission::CreateTest => "create_test",
            Permission::UpdateTest => "update_test",
            Permission::UpdateTestRate => "update_test_rate",
            Permission::DeleteTest => "delete_test",
            Permission::ViewTest => "view_test",
            Permission::ViewTests => "view_tests",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|permission| permission.name() == s)
            .ok_or_else(|| AppError::UnknownPermission(s.to_string()))
    }
}

/// Permissions granted to `role`, in a stable order without duplicates.
pub fn permissions_for_role(role: Role) -> &'static [Permission] {
    use Permission::*;

    match role {
        Role::Admin => &[
            ViewUsers,
            ViewUser,
            CreateUser,
            UpdateUser,
            DeleteUser,
            ViewTests,
            ViewTest,
            CreateTest,
            UpdateTest,
            UpdateTestRate,
            DeleteTest,
        ],
        Role::Manager => &[ViewTests, ViewTest, UpdateTestRate],
    }
}

/// Inverse of [`permissions_for_role`], in catalog role order.
///
/// Derived from the forward table so the two directions cannot drift apart.
pub fn roles_granting_permission(permission: Permission) -> Vec<Role> {
    Role::ALL
        .into_iter()
        .filter(|role| permissions_for_role(*role).contains(&permission))
        .collect()
}
