//! CLI module for Keyward
//!
//! Operator commands:
//! - `migrate`: apply pending schema migrations
//! - `user add`: register a user
//! - `keys`: create, list, delete and rotate API keys

pub mod keys;
pub mod migrate;
pub mod user;

use clap::{Parser, Subcommand};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::infrastructure::{logging, storage};

/// Keyward - API key lifecycle for machine credentials
#[derive(Parser)]
#[command(name = "keyward")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Slug of the user the command acts as
    #[arg(long = "as", global = true, value_name = "SLUG")]
    pub acting_as: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply pending database migrations
    Migrate,

    /// Manage users
    #[command(subcommand)]
    User(user::UserCommand),

    /// Manage API keys
    #[command(subcommand)]
    Keys(keys::KeysCommand),
}

/// Load configuration, install logging and open the database pool
pub(crate) async fn bootstrap() -> anyhow::Result<(AppConfig, PgPool)> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let pool = storage::connect_pool(&config.database).await?;
    Ok((config, pool))
}

/// Print a JSON document on stdout
pub(crate) fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_as_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["keyward", "keys", "list", "--as", "alice"]).unwrap();

        assert_eq!(cli.acting_as.as_deref(), Some("alice"));
        assert!(matches!(
            cli.command,
            Command::Keys(keys::KeysCommand::List { user: None })
        ));
    }

    #[test]
    fn test_rotate_requires_access_key() {
        assert!(Cli::try_parse_from(["keyward", "--as", "root", "keys", "rotate"]).is_err());

        let cli = Cli::try_parse_from([
            "keyward", "--as", "root", "keys", "rotate", "AbC-_d", "--user", "bob",
        ])
        .unwrap();
        match cli.command {
            Command::Keys(keys::KeysCommand::Rotate { access_key, user }) => {
                assert_eq!(access_key, "AbC-_d");
                assert_eq!(user.as_deref(), Some("bob"));
            }
            _ => panic!("expected keys rotate"),
        }
    }

    #[test]
    fn test_user_add_admin_flag() {
        let cli = Cli::try_parse_from(["keyward", "user", "add", "root", "--admin"]).unwrap();

        assert!(matches!(
            cli.command,
            Command::User(user::UserCommand::Add { ref slug, admin: true }) if slug == "root"
        ));
    }

    #[test]
    fn test_migrate_takes_no_arguments() {
        let cli = Cli::try_parse_from(["keyward", "migrate"]).unwrap();
        assert!(matches!(cli.command, Command::Migrate));
        assert!(Cli::try_parse_from(["keyward", "migrate", "now"]).is_err());
    }
}
