//! Keyward
//!
//! API key lifecycle for machine authentication:
//! - Issue access key / secret pairs bound to a user
//! - List keys without ever disclosing secrets
//! - Revoke keys, and rotate them atomically
//! - Self-service or administrator authorization on every operation

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use domain::user::UserRepository;
use infrastructure::api_key::{CredentialStore, KeyLifecycleService, PostgresCredentialRepository};
use infrastructure::user::PostgresUserRepository;

/// Services shared by every command
#[derive(Debug, Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub keys: KeyLifecycleService,
}

/// Wire the Postgres-backed repositories into the lifecycle service
pub fn create_app_state(config: &AppConfig, pool: PgPool) -> AppState {
    let users: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let store = CredentialStore::new(Arc::new(PostgresCredentialRepository::new(pool)))
        .with_operation_timeout(config.credentials.operation_timeout());

    info!(
        operation_timeout_secs = config.credentials.operation_timeout_secs,
        "Credential store ready"
    );

    AppState {
        keys: KeyLifecycleService::new(users.clone(), store),
        users,
    }
}
