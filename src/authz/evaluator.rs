use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppResult;
use crate::rbac::Permission;

use super::ownership::OwnershipResolver;
use super::principal::Principal;

/// Per-resource decision functions.
///
/// A `false` verdict is a normal outcome. `Err` is reserved for store
/// failures hit while checking ownership.
#[async_trait]
pub trait ResourcePolicy: Send + Sync {
    fn can_view_any(&self, principal: &Principal) -> bool;

    async fn can_view(&self, principal: &Principal, resource_id: Uuid) -> AppResult<bool>;

    fn can_create(&self, principal: &Principal) -> bool;

    async fn can_update(&self, principal: &Principal, resource_id: Uuid) -> AppResult<bool>;

    fn can_delete(&self, principal: &Principal) -> bool;
}

/// Which test records a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingScope {
    All,
    OwnedBy(Uuid),
}

/// Which fields an allowed update may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateScope {
    Full,
    RateOnly,
}

impl UpdateScope {
    pub fn allows_field(self, field: &str) -> bool {
        match self {
            UpdateScope::Full => true,
            UpdateScope::RateOnly => field == "rate",
        }
    }
}

/// Policy for test records.
///
/// Unrestricted roles act on any record; ownership-scoped roles only on
/// records they manage.
#[derive(Clone)]
pub struct TestPolicy {
    ownership: OwnershipResolver,
}

impl TestPolicy {
    pub fn new(ownership: OwnershipResolver) -> Self {
        Self { ownership }
    }

    pub fn listing_scope(&self, principal: &Principal) -> Option<ListingScope> {
        if !self.can_view_any(principal) {
            return None;
        }
        if principal.is_unrestricted() {
            Some(ListingScope::All)
        } else if principal.is_ownership_scoped() {
            Some(ListingScope::OwnedBy(principal.user_id))
        } else {
            None
        }
    }

    /// Field scope for an update; `can_update` still decides whether the
    /// update may happen at all.
    pub fn update_scope(&self, principal: &Principal) -> Option<UpdateScope> {
        if principal.is_unrestricted() && principal.can(Permission::UpdateTest) {
            Some(UpdateScope::Full)
        } else if principal.is_ownership_scoped() && principal.can(Permission::UpdateTestRate) {
            Some(UpdateScope::RateOnly)
        } else {
            None
        }
    }

    async fn manages(&self, principal: &Principal, resource_id: Uuid) -> AppResult<bool> {
        self.ownership
            .belongs_to_manager(resource_id, principal.user_id)
            .await
    }
}

#[async_trait]
impl ResourcePolicy for TestPolicy {
    fn can_view_any(&self, principal: &Principal) -> bool {
        principal.can(Permission::ViewTests)
    }

    async fn can_view(&self, principal: &Principal, resource_id: Uuid) -> AppResult<bool> {
        if !principal.can(Permission::ViewTest) {
            return Ok(false);
        }
        if principal.is_unrestricted() {
            return Ok(true);
        }
        if principal.is_ownership_scoped() {
            return self.manages(principal, resource_id).await;
        }
        Ok(false)
    }

    fn can_create(&self, principal: &Principal) -> bool {
        principal.can(Permission::CreateTest)
    }

    async fn can_update(&self, principal: &Principal, resource_id: Uuid) -> AppResult<bool> {
        if principal.is_unrestricted() && principal.can(Permission::UpdateTest) {
            return Ok(true);
        }
        if principal.is_ownership_scoped() && principal.can(Permission::UpdateTestRate) {
            return self.manages(principal, resource_id).await;
        }
        Ok(false)
    }

    fn can_delete(&self, principal: &Principal) -> bool {
        principal.can(Permission::DeleteTest)
    }
}

/// Policy for user accounts: permission membership only.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserPolicy;

impl UserPolicy {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResourcePolicy for UserPolicy {
    fn can_view_any(&self, principal: &Principal) -> bool {
        principal.can(Permission::ViewUsers)
    }

    async fn can_view(&self, principal: &Principal, _resource_id: Uuid) -> AppResult<bool> {
        Ok(principal.can(Permission::ViewUser))
    }

    fn can_create(&self, principal: &Principal) -> bool {
        principal.can(Permission::CreateUser)
    }

    async fn can_update(&self, principal: &Principal, _resource_id: Uuid) -> AppResult<bool> {
        Ok(principal.can(Permission::UpdateUser))
    }

    fn can_delete(&self, principal: &Principal) -> bool {
        principal.can(Permission::DeleteUser)
    }
}
