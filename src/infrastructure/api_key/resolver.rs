//! Identity resolution
//!
//! Answers "who is the object of this operation". Carries no authorization
//! semantics of its own.

use std::sync::Arc;

use tracing::debug;

use crate::domain::user::{Caller, UserId, UserRepository};
use crate::domain::DomainError;

/// Maps an optional target slug onto a concrete user id
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    users: Arc<dyn UserRepository>,
}

impl IdentityResolver {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Resolve the target user. An absent or empty slug means the caller.
    pub async fn resolve(
        &self,
        caller: &Caller,
        target_slug: Option<&str>,
    ) -> Result<UserId, DomainError> {
        let slug = match target_slug {
            None | Some("") => return Ok(caller.user_id()),
            Some(slug) => slug,
        };

        debug!(caller = %caller.user_id(), slug, "Resolving target user");

        self.users
            .get_by_slug(slug)
            .await?
            .map(|user| user.id())
            .ok_or_else(|| DomainError::target_not_found(slug))
    }
}
