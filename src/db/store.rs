use std::collections::BTreeSet;

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::errors::{AppError, AppResult};
use crate::models::rbac::{parse_id, DbPermission, DbRole};
use crate::models::{PermissionRecord, RoleRecord};
use crate::rbac::{RbacStore, ResourceStore};

const GRANT_SQL: &str =
    "INSERT OR IGNORE INTO role_permissions (role_id, permission_id, created_at) VALUES (?, ?, ?)";
const REVOKE_SQL: &str = "DELETE FROM role_permissions WHERE role_id = ? AND permission_id = ?";

/// SQLite-backed store. Ids are stored as hyphenated text.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RbacStore for SqliteStore {
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleRecord>> {
        sqlx::query_as::<_, DbRole>("SELECT id, name, created_at, updated_at FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .map(RoleRecord::try_from)
            .transpose()
    }

    async fn create_role(&self, name: &str) -> AppResult<RoleRecord> {
        let record = RoleRecord::new(name);

        sqlx::query("INSERT INTO roles (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(record.id.to_string())
            .bind(&record.name)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(record)
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<PermissionRecord>> {
        sqlx::query_as::<_, DbPermission>(
            "SELECT id, name, created_at, updated_at FROM permissions WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?
        .map(PermissionRecord::try_from)
        .transpose()
    }

    async fn create_permission(&self, name: &str) -> AppResult<PermissionRecord> {
        let record = PermissionRecord::new(name);

        sqlx::query("INSERT INTO permissions (id, name, created_at, updated_at) VALUES (?, ?, ?, ?)")
            .bind(record.id.to_string())
            .bind(&record.name)
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await?;

        Ok(record)
    }

    async fn grant_permission_to_role(&self, role: &RoleRecord, permission: &PermissionRecord) -> AppResult<()> {
        sqlx::query(GRANT_SQL)
            .bind(role.id.to_string())
            .bind(permission.id.to_string())
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_permission_from_role(&self, role: &RoleRecord, permission: &PermissionRecord) -> AppResult<()> {
        sqlx::query(REVOKE_SQL)
            .bind(role.id.to_string())
            .bind(permission.id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn apply_grant_changes(
        &self,
        role: &RoleRecord,
        revoke: &[PermissionRecord],
        assign: &[PermissionRecord],
    ) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        let now = chrono::Utc::now();

        for permission in revoke {
            sqlx::query(REVOKE_SQL)
                .bind(role.id.to_string())
                .bind(permission.id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        for permission in assign {
            sqlx::query(GRANT_SQL)
                .bind(role.id.to_string())
                .bind(permission.id.to_string())
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE roles SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(role.id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn list_permission_names_of_role(&self, role: &RoleRecord) -> AppResult<BTreeSet<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name
            FROM permissions p
            JOIN role_permissions rp ON rp.permission_id = p.id
            WHERE rp.role_id = ?
            "#,
        )
        .bind(role.id.to_string())
        .fetch_all(&self.pool)
        .await?;

        Ok(names.into_iter().collect())
    }

    async fn get_user_role_name(&self, user_id: Uuid) -> AppResult<String> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = ?
            "#,
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found(format!("no role assigned to user {user_id}")))
    }

    async fn user_has_permission(&self, user_id: Uuid, permission_name: &str) -> AppResult<bool> {
        let matches = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM user_roles ur
            JOIN role_permissions rp ON rp.role_id = ur.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = ? AND p.name = ?
            "#,
        )
        .bind(user_id.to_string())
        .bind(permission_name)
        .fetch_one(&self.pool)
        .await?;

        Ok(matches > 0)
    }

    async fn assign_role_to_user(&self, user_id: Uuid, role: &RoleRecord) -> AppResult<()> {
        let user = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if user.is_none() {
            return Err(AppError::not_found(format!("user {user_id} not found")));
        }

        let existing = sqlx::query_scalar::<_, String>("SELECT role_id FROM user_roles WHERE user_id = ?")
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::conflict(format!("user {user_id} already has a role")));
        }

        let result = sqlx::query("INSERT INTO user_roles (user_id, role_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id.to_string())
            .bind(role.id.to_string())
            .bind(chrono::Utc::now())
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(AppError::conflict(format!("user {user_id} already has a role")))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ResourceStore for SqliteStore {
    async fn list_resources_owned_by(&self, manager_id: Uuid) -> AppResult<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT id FROM tests WHERE manager_id = ? ORDER BY created_at, id",
        )
        .bind(manager_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        ids.iter().map(String::as_str).map(parse_id).collect()
    }
}
