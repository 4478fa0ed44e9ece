//! PostgreSQL credential repository implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::api_key::{
    AccessKey, Credential, CredentialId, CredentialRepository, CredentialSummary,
    CredentialTransaction, KeyMaterial,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

const LIST_SQL: &str = r#"
    SELECT access_key, last_auth
    FROM api_keys
    WHERE user_id = $1
    ORDER BY id ASC
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO api_keys (user_id, access_key, secret_key)
    VALUES ($1, $2, $3)
    RETURNING id
"#;

const DELETE_OWNED_SQL: &str = "DELETE FROM api_keys WHERE user_id = $1 AND access_key = $2";

const RECORD_AUTH_SQL: &str = "UPDATE api_keys SET last_auth = $2 WHERE access_key = $1";

/// PostgreSQL implementation of CredentialRepository
#[derive(Debug, Clone)]
pub struct PostgresCredentialRepository {
    pool: PgPool,
}

impl PostgresCredentialRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialRepository for PostgresCredentialRepository {
    async fn begin(&self) -> Result<Box<dyn CredentialTransaction>, DomainError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage("begin transaction", e.to_string()))?;

        Ok(Box::new(PostgresCredentialTransaction { tx: Some(tx) }))
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<CredentialSummary>, DomainError> {
        let rows = sqlx::query(LIST_SQL)
            .bind(user_id.value())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage("list api keys", e.to_string()))?;

        rows.iter().map(row_to_summary).collect()
    }

    async fn record_auth(
        &self,
        access_key: &AccessKey,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(RECORD_AUTH_SQL)
            .bind(access_key.as_str())
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage("record api key auth", e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }
}

/// Open transaction on a pooled connection. Dropping it without commit
/// rolls back when the connection returns to the pool.
struct PostgresCredentialTransaction {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PostgresCredentialTransaction {
    fn open(&mut self) -> Result<&mut Transaction<'static, Postgres>, DomainError> {
        self.tx
            .as_mut()
            .ok_or_else(|| DomainError::storage("transaction", "Transaction already finished"))
    }
}

#[async_trait]
impl CredentialTransaction for PostgresCredentialTransaction {
    async fn insert(
        &mut self,
        user_id: UserId,
        material: KeyMaterial,
    ) -> Result<Credential, DomainError> {
        let tx = self.open()?;

        let id: i64 = sqlx::query_scalar(INSERT_SQL)
            .bind(user_id.value())
            .bind(material.access_key.as_str())
            .bind(material.secret.as_bytes())
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| insert_error(e.to_string()))?;

        Ok(Credential::new(CredentialId::new(id), user_id, material))
    }

    async fn delete_owned(
        &mut self,
        user_id: UserId,
        access_key: &AccessKey,
    ) -> Result<bool, DomainError> {
        let tx = self.open()?;

        let result = sqlx::query(DELETE_OWNED_SQL)
            .bind(user_id.value())
            .bind(access_key.as_str())
            .execute(&mut **tx)
            .await
            .map_err(|e| DomainError::storage("delete api key", e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DomainError::storage("commit", "Transaction already finished"))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage("commit", e.to_string()))
    }

    async fn rollback(&mut self) -> Result<(), DomainError> {
        let tx = self
            .tx
            .take()
            .ok_or_else(|| DomainError::storage("rollback", "Transaction already finished"))?;

        tx.rollback()
            .await
            .map_err(|e| DomainError::storage("rollback", e.to_string()))
    }
}

/// Unique violations on insert mean the access key is already taken
fn insert_error(message: String) -> DomainError {
    if message.contains("duplicate key") || message.contains("unique constraint") {
        DomainError::conflict("Access key already exists")
    } else {
        DomainError::storage("insert api key", message)
    }
}

fn row_to_summary(row: &PgRow) -> Result<CredentialSummary, DomainError> {
    let access_key: String = row
        .try_get("access_key")
        .map_err(|e| DomainError::storage("list api keys", e.to_string()))?;
    let last_auth: Option<DateTime<Utc>> = row
        .try_get("last_auth")
        .map_err(|e| DomainError::storage("list api keys", e.to_string()))?;

    summary_from_columns(access_key, last_auth)
}

/// Rows holding an access key that no longer validates are reported, not skipped
fn summary_from_columns(
    access_key: String,
    last_auth: Option<DateTime<Utc>>,
) -> Result<CredentialSummary, DomainError> {
    let access_key = AccessKey::new(access_key)
        .map_err(|e| DomainError::storage("list api keys", e.to_string()))?;

    Ok(CredentialSummary {
        access_key,
        last_auth,
    })
}
