//! Keys command - API key lifecycle operations on behalf of a caller

use anyhow::Context;
use clap::Subcommand;
use serde_json::json;
use tracing::{debug, warn};

use crate::domain::user::{Caller, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::api_key::KeyLifecycleService;

#[derive(Subcommand, Debug, Clone)]
pub enum KeysCommand {
    /// Issue a new API key; the secret is shown only here
    Create {
        /// Target user slug (defaults to the acting user)
        #[arg(long)]
        user: Option<String>,
    },

    /// List API keys without their secrets
    List {
        /// Target user slug (defaults to the acting user)
        #[arg(long)]
        user: Option<String>,
    },

    /// Revoke an API key
    Delete {
        /// Access key to revoke
        access_key: String,

        /// Target user slug (defaults to the acting user)
        #[arg(long)]
        user: Option<String>,
    },

    /// Replace an API key with a fresh one
    Rotate {
        /// Access key to replace
        access_key: String,

        /// Target user slug (defaults to the acting user)
        #[arg(long)]
        user: Option<String>,
    },
}

pub async fn run(acting_as: Option<String>, command: KeysCommand) -> anyhow::Result<()> {
    let acting_as = acting_as.context("--as <SLUG> is required for keys commands")?;

    let (config, pool) = super::bootstrap().await?;
    let state = crate::create_app_state(&config, pool);

    let caller = resolve_caller(state.users.as_ref(), &acting_as)
        .await
        .map_err(|e| e.client_error())?;

    let output = execute(&state.keys, &caller, command).await.map_err(|e| {
        warn!(error = %e, "Keys command failed");
        e.client_error()
    })?;
    super::print_json(&output)
}

/// Look up the acting user. Unknown slugs fail like any other authorization failure.
pub async fn resolve_caller(
    users: &dyn UserRepository,
    slug: &str,
) -> Result<Caller, DomainError> {
    let user = users
        .get_by_slug(slug)
        .await?
        .ok_or_else(|| DomainError::target_not_found(slug))?;

    debug!(user_id = %user.id(), "Acting user resolved");
    Ok(user.as_caller())
}

/// Run a keys command for the caller, returning the JSON to print
pub async fn execute(
    service: &KeyLifecycleService,
    caller: &Caller,
    command: KeysCommand,
) -> Result<serde_json::Value, DomainError> {
    let output = match command {
        KeysCommand::Create { user } => {
            let credential = service.create_api_key(caller, user.as_deref()).await?;
            json!(credential)
        }
        KeysCommand::List { user } => {
            let keys = service.list_api_keys(caller, user.as_deref()).await?;
            json!(keys)
        }
        KeysCommand::Delete { access_key, user } => {
            service
                .delete_api_key(caller, user.as_deref(), &access_key)
                .await?;
            json!({ "deleted": access_key })
        }
        KeysCommand::Rotate { access_key, user } => {
            let credential = service
                .rotate_api_key(caller, user.as_deref(), &access_key)
                .await?;
            json!({ "replaced": access_key, "credential": credential })
        }
    };

    Ok(output)
}
