//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User slug cannot be empty")]
    EmptySlug,

    #[error("User slug exceeds maximum length of {0} characters")]
    SlugTooLong(usize),

    #[error("User slug must start with a letter or number")]
    InvalidSlugStart,

    #[error("User slug must end with a letter or number")]
    InvalidSlugEnd,

    #[error("User slug contains invalid character: '{0}'. Only lowercase letters, digits and hyphens are allowed")]
    InvalidSlugCharacter(char),

    #[error("User slug cannot contain consecutive hyphens")]
    ConsecutiveHyphens,
}

const MAX_SLUG_LENGTH: usize = 64;

/// Validate a user slug
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - Only lowercase ASCII letters, digits and hyphens
/// - Must start and end with a letter or digit
/// - No consecutive hyphens
pub fn validate_slug(slug: &str) -> Result<(), UserValidationError> {
    if slug.is_empty() {
        return Err(UserValidationError::EmptySlug);
    }

    if slug.len() > MAX_SLUG_LENGTH {
        return Err(UserValidationError::SlugTooLong(MAX_SLUG_LENGTH));
    }

    let chars: Vec<char> = slug.chars().collect();

    if !is_slug_alnum(chars[0]) {
        return Err(UserValidationError::InvalidSlugStart);
    }

    if !is_slug_alnum(chars[chars.len() - 1]) {
        return Err(UserValidationError::InvalidSlugEnd);
    }

    let mut prev_hyphen = false;

    for c in &chars {
        if *c == '-' {
            if prev_hyphen {
                return Err(UserValidationError::ConsecutiveHyphens);
            }
            prev_hyphen = true;
        } else if is_slug_alnum(*c) {
            prev_hyphen = false;
        } else {
            return Err(UserValidationError::InvalidSlugCharacter(*c));
        }
    }

    Ok(())
}

fn is_slug_alnum(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}
