//! API key domain
//!
//! Credential types, access key validation and the repository traits the
//! lifecycle service drives.

mod entity;
mod repository;
mod validation;

pub use entity::{
    AccessKey, Credential, CredentialId, CredentialSummary, KeyMaterial, SecretKey,
    ACCESS_KEY_BYTES, SECRET_KEY_BYTES,
};
pub use repository::{CredentialRepository, CredentialTransaction};
pub use validation::{validate_access_key, AccessKeyValidationError};
