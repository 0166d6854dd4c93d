use std::collections::BTreeSet;

use uuid::Uuid;

use crate::errors::AppResult;
use crate::rbac::{AccessScope, Permission, RbacStore, Role};

/// The authenticated user with their role and permissions, loaded once per
/// request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Option<Role>,
    pub permissions: BTreeSet<Permission>,
}

impl Principal {
    /// A principal with no role and no permissions; every check denies.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: None,
            permissions: BTreeSet::new(),
        }
    }

    /// Principal whose permissions come straight from the catalog.
    pub fn for_role(user_id: Uuid, role: Role) -> Self {
        Self::new(user_id)
            .with_role(role)
            .with_permissions(role.permissions().iter().copied())
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_permissions(mut self, perms: impl IntoIterator<Item = Permission>) -> Self {
        self.permissions = perms.into_iter().collect();
        self
    }

    /// Resolve the user's role and its stored grants.
    ///
    /// Unknown users propagate `NotFound`. A stored role or permission name
    /// outside the catalog grants nothing.
    pub async fn load<S>(store: &S, user_id: Uuid) -> AppResult<Self>
    where
        S: RbacStore + ?Sized,
    {
        let role_name = store.get_user_role_name(user_id).await?;
        let role = match role_name.parse::<Role>() {
            Ok(role) => role,
            Err(_) => {
                tracing::warn!(user_id = %user_id, role = %role_name, "user holds a role outside the catalog");
                return Ok(Self::new(user_id));
            }
        };

        let Some(record) = store.find_role_by_name(role.name()).await? else {
            return Ok(Self::new(user_id).with_role(role));
        };

        let permissions = store
            .list_permission_names_of_role(&record)
            .await?
            .iter()
            .filter_map(|name| name.parse::<Permission>().ok())
            .collect::<Vec<_>>();

        Ok(Self::new(user_id).with_role(role).with_permissions(permissions))
    }

    pub fn can(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    pub fn access_scope(&self) -> Option<AccessScope> {
        self.role.map(Role::access_scope)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.access_scope() == Some(AccessScope::Unrestricted)
    }

    pub fn is_ownership_scoped(&self) -> bool {
        self.access_scope() == Some(AccessScope::Owned)
    }
}
