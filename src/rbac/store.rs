use std::collections::BTreeSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::models::{PermissionRecord, RoleRecord};

/// Persistence for roles, permissions, grants and user role assignments.
///
/// Names are unique per collection. Implementations never delete role or
/// permission records; only grants change.
#[async_trait]
pub trait RbacStore: Send + Sync {
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>>;

    async fn create_role(&self, name: &str) -> AppResult<RoleRecord>;

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<PermissionRecord>>;

    async fn create_permission(&self, name: &str) -> AppResult<PermissionRecord>;

    async fn grant_permission_to_role(&self, role: &RoleRecord, permission: &PermissionRecord) -> AppResult<()>;

    async fn revoke_permission_from_role(&self, role: &RoleRecord, permission: &PermissionRecord) -> AppResult<()>;

    /// Apply one role's revocations and grants.
    ///
    /// The default issues the calls one by one; backends with transactions
    /// should override it so the block is applied atomically.
    async fn apply_grant_changes(
        &self,
        role: &RoleRecord,
        revoke: &[PermissionRecord],
        assign: &[PermissionRecord],
    ) -> AppResult<()> {
        for permission in revoke {
            self.revoke_permission_from_role(role, permission).await?;
        }
        for permission in assign {
            self.grant_permission_to_role(role, permission).await?;
        }
        Ok(())
    }

    async fn list_permission_names_of_role(&self, role: &RoleRecord) -> AppResult<BTreeSet<String>>;

    /// Name of the user's role. `NotFound` when the user has no assignment.
    async fn get_user_role_name(&self, user_id: Uuid) -> AppResult<String>;

    async fn user_has_permission(&self, user_id: Uuid, permission_name: &str) -> AppResult<bool>;

    /// Store the user's single role. `NotFound` for an unknown user,
    /// `Conflict` if one is already assigned.
    async fn assign_role_to_user(&self, user_id: Uuid, role: &RoleRecord) -> AppResult<()>;
}

/// Read access to test records, as far as authorization needs it.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Ids of tests managed by `manager_id`, oldest first.
    async fn list_resources_owned_by(&self, manager_id: Uuid) -> AppResult<Vec<Uuid>>;
}
