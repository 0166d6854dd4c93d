use std::sync::Arc;

use uuid::Uuid;

use crate::errors::AppResult;
use crate::rbac::ResourceStore;

/// Answers whether a test record is managed by a given user.
///
/// Each call re-reads the manager's owned set; nothing is cached.
#[derive(Clone)]
pub struct OwnershipResolver {
    store: Arc<dyn ResourceStore>,
}

impl OwnershipResolver {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// `Ok(false)` when the manager owns nothing or the test does not exist.
    pub async fn belongs_to_manager(&self, resource_id: Uuid, manager_id: Uuid) -> AppResult<bool> {
        let owned = self.store.list_resources_owned_by(manager_id).await?;
        Ok(owned.contains(&resource_id))
    }
}
