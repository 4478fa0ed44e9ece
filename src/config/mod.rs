mod app_config;

pub use app_config::{AppConfig, CredentialsConfig, DatabaseConfig, LogFormat, LoggingConfig};
