#![allow(dead_code)]

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use rolegate::config::Config;
use rolegate::db;

/// A migrated SQLite database in a temp dir. Keep the struct alive for the
/// duration of the test; dropping it removes the file.
pub struct TestDb {
    pub pool: SqlitePool,
    _dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let db_path = dir.path().join("test.db");
        let config = Config {
            database_url: format!("sqlite://{}", db_path.display()),
            max_connections: 5,
        };

        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        Ok(Self { pool, _dir: dir })
    }

    pub async fn insert_user(&self, name: &str) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query("INSERT INTO users (id, name, email, created_at, updated_at) VALUES (?, ?, ?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(format!("{}@example.com", name.to_lowercase()))
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn insert_test(&self, manager_id: Uuid, rate: i64) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO tests (id, firstname, middlename, lastname, location, rate, criteria, manager_id, created_at, updated_at)
            VALUES (?, 'Jane', 'Q', 'Doe', 'Lviv', ?, 0, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(rate)
        .bind(manager_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    /// Every grant row as (role name, permission name, created_at), sorted.
    pub async fn grant_rows(&self) -> Result<Vec<(String, String, String)>> {
        let rows = sqlx::query_as::<_, (String, String, String)>(
            r#"
            SELECT r.name, p.name, rp.created_at
            FROM role_permissions rp
            JOIN roles r ON r.id = rp.role_id
            JOIN permissions p ON p.id = rp.permission_id
            ORDER BY r.name, p.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn permission_names_of(&self, role: &str) -> Result<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.name
            FROM role_permissions rp
            JOIN roles r ON r.id = rp.role_id
            JOIN permissions p ON p.id = rp.permission_id
            WHERE r.name = ?
            ORDER BY p.name
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }
}
