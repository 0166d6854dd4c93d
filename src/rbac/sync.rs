use std::collections::BTreeSet;
use std::sync::Arc;

use crate::errors::AppResult;
use crate::models::{PermissionRecord, RoleRecord};

use super::catalog::{permissions_for_role, Role};
use super::store::RbacStore;

/// Reconciles stored roles and grants with the in-code catalog.
///
/// Each role is reconciled independently, so an aborted run leaves the store
/// re-runnable. Not safe to run concurrently with itself.
pub struct SyncEngine {
    store: Arc<dyn RbacStore>,
}

impl SyncEngine {
    pub fn new(store: Arc<dyn RbacStore>) -> Self {
        Self { store }
    }

    pub async fn run(&self) -> AppResult<()> {
        for role in Role::ALL {
            self.sync_role(role).await?;
        }
        Ok(())
    }

    async fn sync_role(&self, role: Role) -> AppResult<()> {
        let record = self.first_or_create_role(role.name()).await?;

        let desired: BTreeSet<String> = permissions_for_role(role)
            .iter()
            .map(|permission| permission.name().to_string())
            .collect();
        let current = self.store.list_permission_names_of_role(&record).await?;

        let to_revoke: Vec<&String> = current.difference(&desired).collect();
        let to_assign: Vec<&String> = desired.difference(&current).collect();

        if to_revoke.is_empty() && to_assign.is_empty() {
            tracing::info!(role = %role, "role already in sync");
            return Ok(());
        }

        let mut revoke = Vec::with_capacity(to_revoke.len());
        for name in &to_revoke {
            revoke.push(self.first_or_create_permission(name).await?);
        }

        let mut assign = Vec::with_capacity(to_assign.len());
        for name in &to_assign {
            assign.push(self.first_or_create_permission(name).await?);
        }

        self.store.apply_grant_changes(&record, &revoke, &assign).await?;

        tracing::info!(
            role = %role,
            revoked = revoke.len(),
            assigned = assign.len(),
            "role permissions synced"
        );

        Ok(())
    }

    async fn first_or_create_role(&self, name: &str) -> AppResult<RoleRecord> {
        if let Some(record) = self.store.find_role_by_name(name).await? {
            return Ok(record);
        }
        tracing::debug!(role = %name, "creating role record");
        self.store.create_role(name).await
    }

    async fn first_or_create_permission(&self, name: &str) -> AppResult<PermissionRecord> {
        if let Some(record) = self.store.find_permission_by_name(name).await? {
            return Ok(record);
        }
        tracing::debug!(permission = %name, "creating permission record");
        self.store.create_permission(name).await
    }
}

/// Run a full sync against `store`.
pub async fn sync_roles_and_permissions(store: Arc<dyn RbacStore>) -> AppResult<()> {
    SyncEngine::new(store).run().await
}
