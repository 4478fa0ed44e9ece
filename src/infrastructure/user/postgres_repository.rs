//! PostgreSQL user repository implementation

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::user::{User, UserId, UserRepository, UserRole, UserSlug};
use crate::domain::DomainError;

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let row = sqlx::query("SELECT id, slug, admin FROM users WHERE id = $1")
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("get user", e.to_string()))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query("SELECT id, slug, admin FROM users WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage("look up user by slug", e.to_string()))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn create(&self, slug: UserSlug, role: UserRole) -> Result<User, DomainError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO users (slug, admin)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(slug.as_str())
        .bind(role.is_admin())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!("User with slug '{}' already exists", slug))
            } else {
                DomainError::storage("create user", msg)
            }
        })?;

        Ok(User::new(UserId::new(id), slug, role))
    }
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| DomainError::storage("read user", e.to_string()))?;
    let slug: String = row
        .try_get("slug")
        .map_err(|e| DomainError::storage("read user", e.to_string()))?;
    let admin: bool = row
        .try_get("admin")
        .map_err(|e| DomainError::storage("read user", e.to_string()))?;

    let slug = UserSlug::new(slug).map_err(|e| DomainError::storage("read user", e.to_string()))?;

    Ok(User::new(UserId::new(id), slug, UserRole::from_admin_flag(admin)))
}
