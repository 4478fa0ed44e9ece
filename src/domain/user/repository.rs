//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{User, UserId, UserRole, UserSlug};
use crate::domain::DomainError;

/// Read access to the identity subsystem, plus bootstrap creation
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by their numeric ID
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by their slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, slug: UserSlug, role: UserRole) -> Result<User, DomainError>;

    /// Check if a slug is taken
    async fn slug_exists(&self, slug: &str) -> Result<bool, DomainError> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }
}
