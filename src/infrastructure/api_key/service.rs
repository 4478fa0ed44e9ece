//! API key lifecycle service
//!
//! Every operation runs the same sequence: resolve the target identity,
//! check policy, and only then touch the credential store.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::api_key::{AccessKey, Credential, CredentialSummary};
use crate::domain::policy::{require, Action, PolicyGate, SelfOrAdmin};
use crate::domain::user::{Caller, UserId, UserRepository};
use crate::domain::DomainError;

use super::resolver::IdentityResolver;
use super::store::CredentialStore;

/// Orchestrates create, list, delete and rotate for API keys
#[derive(Clone)]
pub struct KeyLifecycleService {
    resolver: IdentityResolver,
    policy: Arc<dyn PolicyGate>,
    store: CredentialStore,
}

impl std::fmt::Debug for KeyLifecycleService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLifecycleService")
            .field("resolver", &self.resolver)
            .field("store", &self.store)
            .finish()
    }
}

impl KeyLifecycleService {
    /// Create a service with the self-or-admin policy
    pub fn new(users: Arc<dyn UserRepository>, store: CredentialStore) -> Self {
        Self {
            resolver: IdentityResolver::new(users),
            policy: Arc::new(SelfOrAdmin),
            store,
        }
    }

    /// Create with a custom policy gate
    pub fn with_policy(mut self, policy: Arc<dyn PolicyGate>) -> Self {
        self.policy = policy;
        self
    }

    /// Issue a new API key for the target (the caller when no slug is given)
    pub async fn create_api_key(
        &self,
        caller: &Caller,
        target_slug: Option<&str>,
    ) -> Result<Credential, DomainError> {
        let user_id = self
            .authorize(caller, target_slug, Action::ModifyCredentials)
            .await?;

        self.store.create(user_id).await
    }

    /// Delete one of the target's API keys
    pub async fn delete_api_key(
        &self,
        caller: &Caller,
        target_slug: Option<&str>,
        access_key: &str,
    ) -> Result<(), DomainError> {
        let user_id = self
            .authorize(caller, target_slug, Action::ModifyCredentials)
            .await?;
        let access_key = parse_access_key(access_key)?;

        self.store.delete(user_id, &access_key).await
    }

    /// List the target's API keys. Secrets are never included.
    pub async fn list_api_keys(
        &self,
        caller: &Caller,
        target_slug: Option<&str>,
    ) -> Result<Vec<CredentialSummary>, DomainError> {
        let user_id = self
            .authorize(caller, target_slug, Action::ListCredentials)
            .await?;

        self.store.list(user_id).await
    }

    /// Replace the named API key with a fresh one, atomically
    pub async fn rotate_api_key(
        &self,
        caller: &Caller,
        target_slug: Option<&str>,
        access_key: &str,
    ) -> Result<Credential, DomainError> {
        let user_id = self
            .authorize(caller, target_slug, Action::ModifyCredentials)
            .await?;
        let access_key = parse_access_key(access_key)?;

        self.store.rotate(user_id, &access_key).await
    }

    async fn authorize(
        &self,
        caller: &Caller,
        target_slug: Option<&str>,
        action: Action,
    ) -> Result<UserId, DomainError> {
        let target = self.resolver.resolve(caller, target_slug).await.map_err(|e| {
            if e.is_authorization_failure() {
                warn!(caller = %caller.user_id(), %action, "Target resolution failed");
            }
            e
        })?;

        if let Err(e) = require(self.policy.as_ref(), caller, target, action) {
            warn!(caller = %caller.user_id(), target = %target, %action, "Policy denied");
            return Err(e);
        }

        debug!(caller = %caller.user_id(), target = %target, %action, "Policy allowed");
        Ok(target)
    }
}

fn parse_access_key(access_key: &str) -> Result<AccessKey, DomainError> {
    AccessKey::new(access_key).map_err(|e| DomainError::validation(e.to_string()))
}
