//! In-memory credential repository implementation
//!
//! A transaction holds the table lock for its whole lifetime and works on a
//! staged copy, so concurrent transactions serialize and an abandoned one
//! leaves nothing behind.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use crate::domain::api_key::{
    AccessKey, Credential, CredentialId, CredentialRepository, CredentialSummary,
    CredentialTransaction, KeyMaterial, SecretKey,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct CredentialRow {
    id: CredentialId,
    user_id: UserId,
    access_key: AccessKey,
    // Kept only so a row mirrors the persisted shape; secrets are never read back
    #[allow(dead_code)]
    secret: SecretKey,
    last_auth: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
struct CredentialTable {
    rows: Vec<CredentialRow>,
    next_id: i64,
}

/// Operations that can be made to fail on demand
#[derive(Debug, Clone, Copy, Default)]
struct FailurePlan {
    insert: bool,
    delete: bool,
    list: bool,
}

/// In-memory implementation of CredentialRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryCredentialRepository {
    table: Arc<Mutex<CredentialTable>>,
    failures: Arc<RwLock<FailurePlan>>,
}

impl InMemoryCredentialRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert fail with a storage error
    pub async fn set_fail_inserts(&self, fail: bool) {
        self.failures.write().await.insert = fail;
    }

    /// Make every delete fail with a storage error
    pub async fn set_fail_deletes(&self, fail: bool) {
        self.failures.write().await.delete = fail;
    }

    /// Make every list fail with a storage error
    pub async fn set_fail_lists(&self, fail: bool) {
        self.failures.write().await.list = fail;
    }

    /// Number of stored credentials across all users
    pub async fn len(&self) -> usize {
        self.table.lock().await.rows.len()
    }

    /// True when no user holds a credential
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn begin(&self) -> Result<Box<dyn CredentialTransaction>, DomainError> {
        let guard = self.table.clone().lock_owned().await;
        let staged = guard.clone();

        Ok(Box::new(InMemoryTransaction {
            guard: Some(guard),
            staged,
            failures: self.failures.clone(),
        }))
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<CredentialSummary>, DomainError> {
        if self.failures.read().await.list {
            return Err(DomainError::storage(
                "list api keys",
                "In-memory repository configured to fail",
            ));
        }

        let table = self.table.lock().await;

        Ok(table
            .rows
            .iter()
            .filter(|row| row.user_id == user_id)
            .map(|row| CredentialSummary {
                access_key: row.access_key.clone(),
                last_auth: row.last_auth,
            })
            .collect())
    }

    async fn record_auth(
        &self,
        access_key: &AccessKey,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut table = self.table.lock().await;

        match table.rows.iter_mut().find(|row| &row.access_key == access_key) {
            Some(row) => {
                row.last_auth = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

struct InMemoryTransaction {
    guard: Option<OwnedMutexGuard<CredentialTable>>,
    staged: CredentialTable,
    failures: Arc<RwLock<FailurePlan>>,
}

impl InMemoryTransaction {
    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.guard.is_none() {
            return Err(DomainError::storage(
                "transaction",
                "Transaction already finished",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialTransaction for InMemoryTransaction {
    async fn insert(
        &mut self,
        user_id: UserId,
        material: KeyMaterial,
    ) -> Result<Credential, DomainError> {
        self.ensure_open()?;

        if self.failures.read().await.insert {
            return Err(DomainError::storage(
                "insert api key",
                "In-memory repository configured to fail",
            ));
        }

        if self
            .staged
            .rows
            .iter()
            .any(|row| row.access_key == material.access_key)
        {
            return Err(DomainError::conflict("Access key already exists"));
        }

        self.staged.next_id += 1;
        let id = CredentialId::new(self.staged.next_id);

        self.staged.rows.push(CredentialRow {
            id,
            user_id,
            access_key: material.access_key.clone(),
            secret: material.secret.clone(),
            last_auth: None,
        });

        Ok(Credential::new(id, user_id, material))
    }

    async fn delete_owned(
        &mut self,
        user_id: UserId,
        access_key: &AccessKey,
    ) -> Result<bool, DomainError> {
        self.ensure_open()?;

        if self.failures.read().await.delete {
            return Err(DomainError::storage(
                "delete api key",
                "In-memory repository configured to fail",
            ));
        }

        let position = self
            .staged
            .rows
            .iter()
            .position(|row| row.user_id == user_id && &row.access_key == access_key);

        match position {
            Some(index) => {
                let removed = self.staged.rows.remove(index);
                tracing::trace!(credential_id = removed.id.value(), "Staged credential delete");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn commit(&mut self) -> Result<(), DomainError> {
        let mut guard = self.guard.take().ok_or_else(|| {
            DomainError::storage("commit", "Transaction already finished")
        })?;

        *guard = std::mem::take(&mut self.staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), DomainError> {
        self.ensure_open()?;
        self.guard = None;
        self.staged = CredentialTable::default();
        Ok(())
    }
}
