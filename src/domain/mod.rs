//! Domain layer - Core types, traits and errors

pub mod api_key;
pub mod error;
pub mod policy;
pub mod user;

pub use error::{ClientError, ClientErrorKind, DomainError};
