//! Storage infrastructure - connection pool and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{Migration, Migrator, PostgresMigrator};
pub use postgres::connect_pool;
