//! User infrastructure module
//!
//! Slug lookup against the identity subsystem: an in-memory repository and a
//! PostgreSQL one.

mod postgres_repository;
mod repository;

pub use postgres_repository::PostgresUserRepository;
pub use repository::InMemoryUserRepository;
