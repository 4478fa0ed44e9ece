use clap::Parser;
use keyward::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Migrate => cli::migrate::run().await,
        Command::User(command) => cli::user::run(command).await,
        Command::Keys(command) => cli::keys::run(cli.acting_as, command).await,
    }
}
