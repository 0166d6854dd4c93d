use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

// =============================================================================
// ROLE
// =============================================================================

/// Persisted counterpart of a catalog role. Never deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoleRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbRole {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbRole> for RoleRecord {
    type Error = AppError;

    fn try_from(db: DbRole) -> Result<Self, Self::Error> {
        Ok(RoleRecord {
            id: parse_id(&db.id)?,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

// =============================================================================
// PERMISSION
// =============================================================================

/// Persisted counterpart of a catalog permission. Never deleted once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PermissionRecord {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbPermission {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<DbPermission> for PermissionRecord {
    type Error = AppError;

    fn try_from(db: DbPermission) -> Result<Self, Self::Error> {
        Ok(PermissionRecord {
            id: parse_id(&db.id)?,
            name: db.name,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|err| AppError::store(format!("malformed id {raw:?}: {err}")))
}
