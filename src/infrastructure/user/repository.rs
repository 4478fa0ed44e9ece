//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserRepository, UserRole, UserSlug};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct UserTable {
    users: HashMap<UserId, User>,
    /// Index for slug -> user ID lookup
    slug_index: HashMap<String, UserId>,
    next_id: i64,
}

/// In-memory implementation of UserRepository
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: Arc<RwLock<UserTable>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let mut table = UserTable::default();

        for user in users {
            table.next_id = table.next_id.max(user.id().value());
            table
                .slug_index
                .insert(user.slug().as_str().to_string(), user.id());
            table.users.insert(user.id(), user);
        }

        Self {
            table: Arc::new(RwLock::new(table)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, id: UserId) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;
        Ok(table.users.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<User>, DomainError> {
        let table = self.table.read().await;

        Ok(table
            .slug_index
            .get(slug)
            .and_then(|id| table.users.get(id))
            .cloned())
    }

    async fn create(&self, slug: UserSlug, role: UserRole) -> Result<User, DomainError> {
        let mut table = self.table.write().await;

        if table.slug_index.contains_key(slug.as_str()) {
            return Err(DomainError::conflict(format!(
                "User with slug '{}' already exists",
                slug
            )));
        }

        table.next_id += 1;
        let id = UserId::new(table.next_id);
        let user = User::new(id, slug, role);

        table
            .slug_index
            .insert(user.slug().as_str().to_string(), id);
        table.users.insert(id, user.clone());

        Ok(user)
    }
}
