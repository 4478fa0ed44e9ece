//! Credential store
//!
//! Composes generation and persistence into the four store operations. Every
//! mutation runs inside [`CredentialStore::with_transaction`], which commits
//! on success and rolls back on any error, timeout or dropped future.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::api_key::{
    AccessKey, Credential, CredentialRepository, CredentialSummary, CredentialTransaction,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

use super::generator::{CredentialGenerator, RandomCredentialGenerator};

const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Future returned by a unit of transactional work
pub type TransactionFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, DomainError>> + Send + 't>>;

/// Persistence-facing owner of every user's live credentials
#[derive(Clone)]
pub struct CredentialStore {
    repository: Arc<dyn CredentialRepository>,
    generator: Arc<dyn CredentialGenerator>,
    operation_timeout: Duration,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("repository", &self.repository)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl CredentialStore {
    /// Create a store over `repository` using the OS random source
    pub fn new(repository: Arc<dyn CredentialRepository>) -> Self {
        Self {
            repository,
            generator: Arc::new(RandomCredentialGenerator::new()),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: Arc<dyn CredentialGenerator>) -> Self {
        self.generator = generator;
        self
    }

    /// Upper bound for a single store operation
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Issue a new credential for `user_id`. The only call that returns a secret.
    pub async fn create(&self, user_id: UserId) -> Result<Credential, DomainError> {
        let material = self.generator.generate()?;

        let credential = self
            .with_transaction("create api key", move |tx| {
                Box::pin(async move { tx.insert(user_id, material).await })
            })
            .await?;

        info!(user_id = %user_id, access_key = %credential.access_key(), "API key created");
        Ok(credential)
    }

    /// List `user_id`'s credentials, oldest first
    pub async fn list(&self, user_id: UserId) -> Result<Vec<CredentialSummary>, DomainError> {
        self.bounded("list api keys", self.repository.list(user_id))
            .await
    }

    /// Delete the credential matching both owner and access key
    pub async fn delete(&self, user_id: UserId, access_key: &AccessKey) -> Result<(), DomainError> {
        let target = access_key.clone();

        self.with_transaction("delete api key", move |tx| {
            Box::pin(async move {
                if tx.delete_owned(user_id, &target).await? {
                    Ok(())
                } else {
                    Err(DomainError::CredentialNotFound)
                }
            })
        })
        .await?;

        info!(user_id = %user_id, access_key = %access_key, "API key deleted");
        Ok(())
    }

    /// Replace a credential with a fresh one for the same owner, atomically.
    ///
    /// Material is generated before the transaction opens, so an entropy
    /// failure touches nothing. If the delete finds nothing or the insert
    /// fails, the transaction rolls back and the original key stays valid.
    pub async fn rotate(
        &self,
        user_id: UserId,
        access_key: &AccessKey,
    ) -> Result<Credential, DomainError> {
        let material = self.generator.generate()?;
        let target = access_key.clone();

        let credential = self
            .with_transaction("rotate api key", move |tx| {
                Box::pin(async move {
                    if !tx.delete_owned(user_id, &target).await? {
                        return Err(DomainError::CredentialNotFound);
                    }
                    tx.insert(user_id, material).await
                })
            })
            .await?;

        info!(
            user_id = %user_id,
            old_access_key = %access_key,
            new_access_key = %credential.access_key(),
            "API key rotated"
        );
        Ok(credential)
    }

    /// Stamp a successful authentication with the current time
    pub async fn record_auth(&self, access_key: &AccessKey) -> Result<bool, DomainError> {
        self.bounded(
            "record api key auth",
            self.repository.record_auth(access_key, Utc::now()),
        )
        .await
    }

    /// Run `work` inside one transaction: commit on success, roll back on error.
    ///
    /// The whole unit is bounded by the operation timeout. When the timeout
    /// fires, or the caller drops this future, the open transaction handle is
    /// dropped and the backend discards its changes.
    pub async fn with_transaction<T, F>(
        &self,
        operation: &'static str,
        work: F,
    ) -> Result<T, DomainError>
    where
        T: Send,
        F: for<'t> FnOnce(&'t mut (dyn CredentialTransaction + 'static)) -> TransactionFuture<'t, T>
            + Send,
    {
        let unit = async move {
            let mut tx = self.repository.begin().await?;
            debug!(operation, "Transaction opened");

            match work(tx.as_mut()).await {
                Ok(value) => {
                    tx.commit().await?;
                    debug!(operation, "Transaction committed");
                    Ok(value)
                }
                Err(err) => {
                    warn!(operation, error = %err, "Rolling back transaction");
                    if let Err(rollback_err) = tx.rollback().await {
                        warn!(operation, error = %rollback_err, "Rollback failed");
                    }
                    Err(err)
                }
            }
        };

        self.bounded(operation, unit).await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, DomainError>>,
    ) -> Result<T, DomainError> {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout = ?self.operation_timeout, "Store operation timed out");
                Err(DomainError::cancelled(operation))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::api_key::{KeyMaterial, SECRET_KEY_BYTES};
    use crate::infrastructure::api_key::{InMemoryCredentialRepository, MockCredentialGenerator};
    use tokio_test::{assert_err, assert_ok};

    fn store_over(repo: &InMemoryCredentialRepository) -> CredentialStore {
        CredentialStore::new(Arc::new(repo.clone()))
    }

    fn keys_of(summaries: &[CredentialSummary]) -> Vec<AccessKey> {
        summaries.iter().map(|s| s.access_key.clone()).collect()
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);

        let before = store.list(user).await.unwrap().len();
        let created = store.create(user).await.unwrap();
        let after = store.list(user).await.unwrap();

        assert_eq!(after.len(), before + 1);
        assert_eq!(&after.last().unwrap().access_key, created.access_key());
        assert_eq!(created.secret_key().len(), SECRET_KEY_BYTES);
        assert_eq!(created.user_id(), user);
    }

    #[tokio::test]
    async fn test_delete_own_key() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);

        let created = store.create(user).await.unwrap();
        assert_ok!(store.delete(user, created.access_key()).await);
        assert!(store.list(user).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_foreign_key_is_not_found() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);

        let foreign = store.create(UserId::new(2)).await.unwrap();
        let err = store.delete(UserId::new(1), foreign.access_key()).await.unwrap_err();

        assert!(matches!(err, DomainError::CredentialNotFound));
        assert_eq!(store.list(UserId::new(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_key_is_not_found() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let unknown = AccessKey::new("nope").unwrap();

        let err = store.delete(UserId::new(1), &unknown).await.unwrap_err();
        assert!(matches!(err, DomainError::CredentialNotFound));
    }

    #[tokio::test]
    async fn test_rotate_replaces_key() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);

        let keep = store.create(user).await.unwrap();
        let old = store.create(user).await.unwrap();
        let rotated = store.rotate(user, old.access_key()).await.unwrap();

        let keys = keys_of(&store.list(user).await.unwrap());
        assert_eq!(keys.len(), 2);
        assert!(keys.contains(keep.access_key()));
        assert!(keys.contains(rotated.access_key()));
        assert!(!keys.contains(old.access_key()));
        assert_ne!(rotated.secret_key(), old.secret_key());
        assert_eq!(rotated.user_id(), user);
    }

    #[tokio::test]
    async fn test_rotate_insert_failure_leaves_key_intact() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);

        let original = store.create(user).await.unwrap();
        let before = store.list(user).await.unwrap();

        repo.set_fail_inserts(true).await;
        let err = store.rotate(user, original.access_key()).await.unwrap_err();
        repo.set_fail_inserts(false).await;

        assert!(matches!(err, DomainError::Storage { .. }));
        assert_eq!(store.list(user).await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_rotate_delete_failure_creates_nothing() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);
        let original = store.create(user).await.unwrap();

        repo.set_fail_deletes(true).await;
        let rotate_err = store.rotate(user, original.access_key()).await.unwrap_err();
        let delete_err = store.delete(user, original.access_key()).await.unwrap_err();
        repo.set_fail_deletes(false).await;

        assert!(matches!(rotate_err, DomainError::Storage { .. }));
        assert!(matches!(delete_err, DomainError::Storage { .. }));
        assert_eq!(
            keys_of(&store.list(user).await.unwrap()),
            vec![original.access_key().clone()]
        );
    }

    #[tokio::test]
    async fn test_rotate_conflict_leaves_key_intact() {
        let repo = InMemoryCredentialRepository::new();
        let user = UserId::new(1);

        let existing = store_over(&repo).create(UserId::new(2)).await.unwrap();
        let original = store_over(&repo).create(user).await.unwrap();

        let colliding = existing.access_key().clone();
        let mut generator = MockCredentialGenerator::new();
        generator.expect_generate().times(1).returning(move || {
            Ok(KeyMaterial {
                access_key: colliding.clone(),
                secret: crate::domain::api_key::SecretKey::new(vec![0u8; SECRET_KEY_BYTES]),
            })
        });

        let store = store_over(&repo).with_generator(Arc::new(generator));
        let err = store.rotate(user, original.access_key()).await.unwrap_err();

        assert!(matches!(err, DomainError::Conflict { .. }));
        assert_eq!(
            keys_of(&store.list(user).await.unwrap()),
            vec![original.access_key().clone()]
        );
    }

    #[tokio::test]
    async fn test_rotate_unknown_key_creates_nothing() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let unknown = AccessKey::new("missing").unwrap();

        let err = store.rotate(UserId::new(1), &unknown).await.unwrap_err();

        assert!(matches!(err, DomainError::CredentialNotFound));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_rotate_entropy_failure_touches_nothing() {
        let repo = InMemoryCredentialRepository::new();
        let user = UserId::new(1);
        let original = store_over(&repo).create(user).await.unwrap();

        let mut generator = MockCredentialGenerator::new();
        generator
            .expect_generate()
            .returning(|| Err(DomainError::entropy_unavailable("exhausted")));

        let store = store_over(&repo).with_generator(Arc::new(generator));
        let err = store.rotate(user, original.access_key()).await.unwrap_err();

        assert!(matches!(err, DomainError::EntropyUnavailable { .. }));
        assert_eq!(store.list(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_rotate_and_delete_have_one_winner() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);
        let original = store.create(user).await.unwrap();

        let rotate_store = store.clone();
        let delete_store = store.clone();
        let rotate_key = original.access_key().clone();
        let delete_key = original.access_key().clone();

        let (rotated, deleted) = tokio::join!(
            tokio::spawn(async move { rotate_store.rotate(user, &rotate_key).await }),
            tokio::spawn(async move { delete_store.delete(user, &delete_key).await }),
        );
        let rotated = rotated.unwrap();
        let deleted = deleted.unwrap();

        let remaining = store.list(user).await.unwrap();
        match (rotated, deleted) {
            (Ok(credential), Err(DomainError::CredentialNotFound)) => {
                assert_eq!(keys_of(&remaining), vec![credential.access_key().clone()]);
            }
            (Err(DomainError::CredentialNotFound), Ok(())) => {
                assert!(remaining.is_empty());
            }
            (r, d) => panic!("expected exactly one winner, got {:?} / {:?}", r, d),
        }
    }

    #[tokio::test]
    async fn test_operation_timeout_rolls_back() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo).with_operation_timeout(Duration::from_millis(20));

        let result: Result<(), DomainError> = store
            .with_transaction("slow work", |tx| {
                Box::pin(async move {
                    let material = RandomCredentialGenerator::new().generate()?;
                    tx.insert(UserId::new(1), material).await?;
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    Ok(())
                })
            })
            .await;

        let err = assert_err!(result);
        assert!(matches!(err, DomainError::Cancelled { .. }));
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_record_auth_visible_in_list() {
        let repo = InMemoryCredentialRepository::new();
        let store = store_over(&repo);
        let user = UserId::new(1);
        let created = store.create(user).await.unwrap();

        assert!(store.record_auth(created.access_key()).await.unwrap());
        assert!(store.list(user).await.unwrap()[0].last_auth.is_some());
    }
}
