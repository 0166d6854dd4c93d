//! In-memory store for unit tests.
//!
//! Keeps a log of every mutating call so tests can assert exactly what a
//! sync touched.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::{PermissionRecord, RoleRecord};

use super::store::{RbacStore, ResourceStore};

/// One mutating call observed by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMutation {
    CreateRole(String),
    CreatePermission(String),
    Grant { role: String, permission: String },
    Revoke { role: String, permission: String },
    AssignRole { user_id: Uuid, role: String },
}

#[derive(Debug, Default)]
struct State {
    roles: Vec<RoleRecord>,
    permissions: Vec<PermissionRecord>,
    grants: BTreeSet<(Uuid, Uuid)>,
    user_roles: HashMap<Uuid, Uuid>,
    tests: Vec<(Uuid, Uuid)>,
    mutations: Vec<StoreMutation>,
    failing_role: Option<String>,
}

impl State {
    fn permission_names_of(&self, role_id: Uuid) -> BTreeSet<String> {
        self.grants
            .iter()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| self.permissions.iter().find(|perm| perm.id == *p))
            .map(|perm| perm.name.clone())
            .collect()
    }

    fn check_failure(&self, role: &RoleRecord) -> AppResult<()> {
        match &self.failing_role {
            Some(name) if *name == role.name => {
                Err(AppError::store(format!("injected failure for role {name}")))
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test record managed by `manager_id`.
    pub async fn insert_test(&self, test_id: Uuid, manager_id: Uuid) {
        self.state.lock().await.tests.push((test_id, manager_id));
    }

    /// Make every grant change for `role_name` fail with a store error.
    pub async fn fail_grant_changes_for(&self, role_name: &str) {
        self.state.lock().await.failing_role = Some(role_name.to_string());
    }

    pub async fn mutations(&self) -> Vec<StoreMutation> {
        self.state.lock().await.mutations.clone()
    }

    pub async fn clear_mutations(&self) {
        self.state.lock().await.mutations.clear();
    }

    /// Snapshot of every role's granted permission names, keyed by role name.
    pub async fn grants_by_role(&self) -> HashMap<String, BTreeSet<String>> {
        let state = self.state.lock().await;
        state
            .roles
            .iter()
            .map(|role| (role.name.clone(), state.permission_names_of(role.id)))
            .collect()
    }
}

#[async_trait]
impl RbacStore for MemoryStore {
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        let state = self.state.lock().await;
        Ok(state.roles.iter().find(|role| role.name == name).cloned())
    }

    async fn create_role(&self, name: &str) -> AppResult<RoleRecord> {
        let mut state = self.state.lock().await;
        if state.roles.iter().any(|role| role.name == name) {
            return Err(AppError::conflict(format!("role {name} already exists")));
        }
        let record = RoleRecord::new(name);
        state.roles.push(record.clone());
        state.mutations.push(StoreMutation::CreateRole(name.to_string()));
        Ok(record)
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<PermissionRecord>> {
        let state = self.state.lock().await;
        Ok(state.permissions.iter().find(|perm| perm.name == name).cloned())
    }

    async fn create_permission(&self, name: &str) -> AppResult<PermissionRecord> {
        let mut state = self.state.lock().await;
        if state.permissions.iter().any(|perm| perm.name == name) {
            return Err(AppError::conflict(format!("permission {name} already exists")));
        }
        let record = PermissionRecord::new(name);
        state.permissions.push(record.clone());
        state.mutations.push(StoreMutation::CreatePermission(name.to_string()));
        Ok(record)
    }

    async fn grant_permission_to_role(&self, role: &RoleRecord, permission: &PermissionRecord) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.check_failure(role)?;
        state.grants.insert((role.id, permission.id));
        state.mutations.push(StoreMutation::Grant {
            role: role.name.clone(),
            permission: permission.name.clone(),
        });
        Ok(())
    }

    async fn revoke_permission_from_role(&self, role: &RoleRecord, permission: &PermissionRecord) -> AppResult<()> {
        let mut state = self.state.lock().await;
        state.check_failure(role)?;
        state.grants.remove(&(role.id, permission.id));
        state.mutations.push(StoreMutation::Revoke {
            role: role.name.clone(),
            permission: permission.name.clone(),
        });
        Ok(())
    }

    async fn list_permission_names_of_role(&self, role: &RoleRecord) -> AppResult<BTreeSet<String>> {
        Ok(self.state.lock().await.permission_names_of(role.id))
    }

    async fn get_user_role_name(&self, user_id: Uuid) -> AppResult<String> {
        let state = self.state.lock().await;
        let role_id = state
            .user_roles
            .get(&user_id)
            .ok_or_else(|| AppError::not_found(format!("no role assigned to user {user_id}")))?;
        state
            .roles
            .iter()
            .find(|role| role.id == *role_id)
            .map(|role| role.name.clone())
            .ok_or_else(|| AppError::not_found(format!("role {role_id} not found")))
    }

    async fn user_has_permission(&self, user_id: Uuid, permission_name: &str) -> AppResult<bool> {
        let state = self.state.lock().await;
        Ok(match state.user_roles.get(&user_id) {
            Some(role_id) => state.permission_names_of(*role_id).contains(permission_name),
            None => false,
        })
    }

    async fn assign_role_to_user(&self, user_id: Uuid, role: &RoleRecord) -> AppResult<()> {
        let mut state = self.state.lock().await;
        if state.user_roles.contains_key(&user_id) {
            return Err(AppError::conflict(format!("user {user_id} already has a role")));
        }
        state.user_roles.insert(user_id, role.id);
        state.mutations.push(StoreMutation::AssignRole {
            user_id,
            role: role.name.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl ResourceStore for MemoryStore {
    async fn list_resources_owned_by(&self, manager_id: Uuid) -> AppResult<Vec<Uuid>> {
        let state = self.state.lock().await;
        Ok(state
            .tests
            .iter()
            .filter(|(_, manager)| *manager == manager_id)
            .map(|(test, _)| *test)
            .collect())
    }
}
