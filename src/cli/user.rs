//! User command - registers users in the identity table

use clap::Subcommand;
use serde_json::json;
use tracing::info;

use crate::domain::user::{UserRepository, UserRole, UserSlug};
use crate::domain::DomainError;

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommand {
    /// Register a new user
    Add {
        /// Unique slug (lowercase letters, digits and hyphens)
        slug: String,

        /// Grant the administrator role
        #[arg(long)]
        admin: bool,
    },
}

pub async fn run(command: UserCommand) -> anyhow::Result<()> {
    let (config, pool) = super::bootstrap().await?;
    let state = crate::create_app_state(&config, pool);

    let output = execute(state.users.as_ref(), command)
        .await
        .map_err(|e| e.client_error())?;
    super::print_json(&output)
}

/// Run a user command against a repository, returning the JSON to print
pub async fn execute(
    users: &dyn UserRepository,
    command: UserCommand,
) -> Result<serde_json::Value, DomainError> {
    match command {
        UserCommand::Add { slug, admin } => {
            let slug = UserSlug::new(slug).map_err(|e| DomainError::validation(e.to_string()))?;
            let user = users.create(slug, UserRole::from_admin_flag(admin)).await?;

            info!(user_id = %user.id(), slug = %user.slug(), admin, "User added");
            Ok(json!({
                "id": user.id(),
                "slug": user.slug(),
                "admin": user.role().is_admin(),
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::user::InMemoryUserRepository;

    #[tokio::test]
    async fn test_add_user() {
        let users = InMemoryUserRepository::new();
        let output = execute(
            &users,
            UserCommand::Add {
                slug: "root".to_string(),
                admin: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(output["slug"], "root");
        assert_eq!(output["admin"], true);
        assert!(users.get_by_slug("root").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_user_rejects_bad_slug() {
        let users = InMemoryUserRepository::new();
        let result = execute(
            &users,
            UserCommand::Add {
                slug: "Not A Slug".to_string(),
                admin: false,
            },
        )
        .await;

        assert!(matches!(result, Err(DomainError::Validation { .. })));
    }
}
