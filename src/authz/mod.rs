//! Authorization decisions.
//!
//! Verdicts combine permission membership with the principal's access scope
//! and, for ownership-scoped roles, the ownership resolver. Re-pointing a
//! permission to another role only needs a catalog change.

mod evaluator;
mod ownership;
mod principal;

pub use evaluator::{ListingScope, ResourcePolicy, TestPolicy, UpdateScope, UserPolicy};
pub use ownership::OwnershipResolver;
pub use principal::Principal;

use uuid::Uuid;

use crate::errors::{AppError, AppResult};

/// An action requested against a resource type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ViewAny,
    View(Uuid),
    Create,
    Update(Uuid),
    Delete(Uuid),
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Action::ViewAny => "list",
            Action::View(_) => "view",
            Action::Create => "create",
            Action::Update(_) => "update",
            Action::Delete(_) => "delete",
        }
    }
}

/// Evaluate `action` and turn a denial into `Forbidden` for the request layer.
///
/// Store failures pass through unchanged so they are never reported as a
/// denial.
pub async fn authorize<P>(policy: &P, principal: &Principal, action: Action) -> AppResult<()>
where
    P: ResourcePolicy + ?Sized,
{
    let allowed = match action {
        Action::ViewAny => policy.can_view_any(principal),
        Action::View(id) => policy.can_view(principal, id).await?,
        Action::Create => policy.can_create(principal),
        Action::Update(id) => policy.can_update(principal, id).await?,
        Action::Delete(_) => policy.can_delete(principal),
    };

    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden(format!("not allowed to {}", action.verb())))
    }
}
