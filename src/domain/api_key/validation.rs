//! Access key validation utilities

use thiserror::Error;

/// Errors that can occur while validating a caller-supplied access key
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AccessKeyValidationError {
    #[error("Access key cannot be empty")]
    Empty,

    #[error("Access key exceeds maximum length of {0} characters")]
    TooLong(usize),

    #[error("Access key contains invalid character: '{0}'")]
    InvalidCharacter(char),
}

const MAX_ACCESS_KEY_LENGTH: usize = 128;

/// Validate an access key string
///
/// Access keys are URL-safe base64 text. Padding is tolerated so keys issued
/// under other lengths still parse.
pub fn validate_access_key(key: &str) -> Result<(), AccessKeyValidationError> {
    if key.is_empty() {
        return Err(AccessKeyValidationError::Empty);
    }

    if key.len() > MAX_ACCESS_KEY_LENGTH {
        return Err(AccessKeyValidationError::TooLong(MAX_ACCESS_KEY_LENGTH));
    }

    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')))
    {
        return Err(AccessKeyValidationError::InvalidCharacter(c));
    }

    Ok(())
}
