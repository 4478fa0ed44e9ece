//! Credential repository traits
//!
//! Mutations go through a [`CredentialTransaction`] handle obtained from
//! [`CredentialRepository::begin`]. A handle dropped without `commit` rolls
//! back, so every early return leaves the store untouched.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;

use super::entity::{AccessKey, Credential, CredentialSummary, KeyMaterial};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Repository trait for credential storage
#[async_trait]
pub trait CredentialRepository: Send + Sync + Debug {
    /// Open a transaction
    async fn begin(&self) -> Result<Box<dyn CredentialTransaction>, DomainError>;

    /// List a user's credentials, oldest first
    async fn list(&self, user_id: UserId) -> Result<Vec<CredentialSummary>, DomainError>;

    /// Stamp a successful authentication. Returns false if no such key.
    async fn record_auth(
        &self,
        access_key: &AccessKey,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}

/// Scoped write access to the credential table
#[async_trait]
pub trait CredentialTransaction: Send {
    /// Insert a credential for `user_id`
    async fn insert(
        &mut self,
        user_id: UserId,
        material: KeyMaterial,
    ) -> Result<Credential, DomainError>;

    /// Delete the credential matching both owner and access key.
    /// Returns false when nothing matched.
    async fn delete_owned(
        &mut self,
        user_id: UserId,
        access_key: &AccessKey,
    ) -> Result<bool, DomainError>;

    /// Make every change in this transaction durable
    async fn commit(&mut self) -> Result<(), DomainError>;

    /// Discard every change in this transaction
    async fn rollback(&mut self) -> Result<(), DomainError>;
}
