//! Credential entity and related types

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use super::validation::{validate_access_key, AccessKeyValidationError};
use crate::domain::user::UserId;

/// Number of random bytes behind every access key
pub const ACCESS_KEY_BYTES: usize = 18;

/// Length of every secret key in bytes
pub const SECRET_KEY_BYTES: usize = 64;

/// Store-assigned row identifier. Never leaves the persistence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CredentialId(i64);

impl CredentialId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Public identifier of a credential, unique across all users
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccessKey(String);

impl AccessKey {
    /// Create a new AccessKey after validation
    pub fn new(key: impl Into<String>) -> Result<Self, AccessKeyValidationError> {
        let key = key.into();
        validate_access_key(&key)?;
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for AccessKey {
    type Error = AccessKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AccessKey> for String {
    fn from(key: AccessKey) -> Self {
        key.0
    }
}

impl std::fmt::Display for AccessKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Secret half of a credential.
///
/// `Debug` is redacted; serialization (base64) exists only so the issuing
/// response can carry it back to the caller once.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey([REDACTED; {}])", self.0.len())
    }
}

impl Serialize for SecretKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

/// Freshly generated access/secret pair, not yet persisted
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub access_key: AccessKey,
    pub secret: SecretKey,
}

/// A live API key as returned at issuance time, secret included
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    #[serde(skip)]
    id: CredentialId,
    access_key: AccessKey,
    secret_key: SecretKey,
    #[serde(skip)]
    user_id: UserId,
    last_auth: Option<DateTime<Utc>>,
}

impl Credential {
    pub fn new(id: CredentialId, user_id: UserId, material: KeyMaterial) -> Self {
        Self {
            id,
            access_key: material.access_key,
            secret_key: material.secret,
            user_id,
            last_auth: None,
        }
    }

    pub fn id(&self) -> CredentialId {
        self.id
    }

    pub fn access_key(&self) -> &AccessKey {
        &self.access_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn last_auth(&self) -> Option<DateTime<Utc>> {
        self.last_auth
    }

    /// Public view of this credential
    pub fn summary(&self) -> CredentialSummary {
        CredentialSummary {
            access_key: self.access_key.clone(),
            last_auth: self.last_auth,
        }
    }
}

/// What list operations disclose about a credential. Carries no secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialSummary {
    pub access_key: AccessKey,
    pub last_auth: Option<DateTime<Utc>>,
}
