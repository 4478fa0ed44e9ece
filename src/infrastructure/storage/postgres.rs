//! PostgreSQL connection pooling

use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::domain::DomainError;

/// Open a connection pool sized by the database configuration
pub async fn connect_pool(config: &DatabaseConfig) -> Result<PgPool, DomainError> {
    let pool = pool_options(config)
        .connect(&config.url)
        .await
        .map_err(|e| DomainError::storage("connect to PostgreSQL", e.to_string()))?;

    info!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Connected to PostgreSQL"
    );

    Ok(pool)
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections.min(config.max_connections))
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_options_follow_config() {
        let config = DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 20,
            min_connections: 5,
            connect_timeout_secs: 60,
            idle_timeout_secs: 300,
        };

        let options = pool_options(&config);
        assert_eq!(options.get_max_connections(), 20);
        assert_eq!(options.get_min_connections(), 5);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(60));
        assert_eq!(options.get_idle_timeout(), Some(Duration::from_secs(300)));
    }

    #[test]
    fn test_min_connections_capped_by_max() {
        let config = DatabaseConfig {
            max_connections: 2,
            min_connections: 8,
            ..DatabaseConfig::default()
        };

        assert_eq!(pool_options(&config).get_min_connections(), 2);
    }
}
