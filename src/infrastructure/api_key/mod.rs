//! API key infrastructure
//!
//! Credential generation, identity resolution, the transactional credential
//! store and the lifecycle service that ties them together.

mod generator;
mod postgres_repository;
mod repository;
mod resolver;
mod service;
mod store;

pub use generator::{CredentialGenerator, RandomCredentialGenerator};
pub use postgres_repository::PostgresCredentialRepository;
pub use repository::InMemoryCredentialRepository;
pub use resolver::IdentityResolver;
pub use service::KeyLifecycleService;
pub use store::{CredentialStore, TransactionFuture};

#[cfg(test)]
pub use generator::MockCredentialGenerator;
