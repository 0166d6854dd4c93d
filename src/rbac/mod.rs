//! Role and permission catalog, its persistence seam, and the sync that keeps
//! the two in agreement.

pub mod catalog;
#[cfg(test)]
pub(crate) mod memory;
pub mod store;
pub mod sync;

pub use catalog::{permissions_for_role, roles_granting_permission, AccessScope, Permission, Role};
#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub use store::{RbacStore, ResourceStore};
pub use sync::{sync_roles_and_permissions, SyncEngine};

use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::RoleRecord;

/// Give `user_id` its single role. Requires the role record to exist, i.e. a
/// sync must have run.
pub async fn assign_role_to_user<S>(store: &S, user_id: Uuid, role: Role) -> AppResult<RoleRecord>
where
    S: RbacStore + ?Sized,
{
    let record = store
        .find_role_by_name(role.name())
        .await?
        .ok_or_else(|| AppError::not_found(format!("role {role} has not been synced")))?;

    store.assign_role_to_user(user_id, &record).await?;
    tracing::info!(user_id = %user_id, role = %role, "role assigned");

    Ok(record)
}

/// Whether `user_id` currently holds `role`.
///
/// Users without an assignment, unknown users and roles outside the catalog
/// all answer `false`; only store failures are errors.
pub async fn user_holds_role<S>(store: &S, user_id: Uuid, role: Role) -> AppResult<bool>
where
    S: RbacStore + ?Sized,
{
    match store.get_user_role_name(user_id).await {
        Ok(name) => Ok(name.parse::<Role>().ok() == Some(role)),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}
