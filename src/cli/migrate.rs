//! Migrate command - applies pending schema migrations

use tracing::info;

use crate::infrastructure::storage::{Migrator, PostgresMigrator};

pub async fn run() -> anyhow::Result<()> {
    let (_config, pool) = super::bootstrap().await?;

    let migrator = PostgresMigrator::new(pool);
    migrator.run().await?;

    let version = migrator.version().await?;
    info!(version = ?version, "Schema up to date");
    super::print_json(&serde_json::json!({ "schemaVersion": version }))
}
