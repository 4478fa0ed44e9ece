//! User entity and caller identity

use serde::{Deserialize, Serialize};

use super::validation::{validate_slug, UserValidationError};

/// Numeric user identifier, stable for the lifetime of the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing unique alias for a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserSlug(String);

impl UserSlug {
    /// Create a new UserSlug after validation
    pub fn new(slug: impl Into<String>) -> Result<Self, UserValidationError> {
        let slug = slug.into();
        validate_slug(&slug)?;
        Ok(Self(slug))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for UserSlug {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserSlug> for String {
    fn from(slug: UserSlug) -> Self {
        slug.0
    }
}

impl std::fmt::Display for UserSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role flag carried by every user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Administrator,
    #[default]
    Standard,
}

impl UserRole {
    pub fn from_admin_flag(admin: bool) -> Self {
        if admin {
            Self::Administrator
        } else {
            Self::Standard
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Administrator)
    }
}

/// User as seen by this core. Owned by the identity subsystem; read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    slug: UserSlug,
    role: UserRole,
}

impl User {
    pub fn new(id: UserId, slug: UserSlug, role: UserRole) -> Self {
        Self { id, slug, role }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn slug(&self) -> &UserSlug {
        &self.slug
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    /// Identity this user presents when acting as a caller
    pub fn as_caller(&self) -> Caller {
        Caller::new(self.id, self.role)
    }
}

/// Identity attached to an inbound call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    user_id: UserId,
    role: UserRole,
}

impl Caller {
    pub fn new(user_id: UserId, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn standard(user_id: i64) -> Self {
        Self::new(UserId::new(user_id), UserRole::Standard)
    }

    pub fn administrator(user_id: i64) -> Self {
        Self::new(UserId::new(user_id), UserRole::Administrator)
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_slug_valid() {
        let slug = UserSlug::new("alice").unwrap();
        assert_eq!(slug.as_str(), "alice");
    }

    #[test]
    fn test_user_slug_invalid() {
        assert!(UserSlug::new("").is_err());
        assert!(UserSlug::new("Alice").is_err());
    }

    #[test]
    fn test_role_from_admin_flag() {
        assert_eq!(UserRole::from_admin_flag(true), UserRole::Administrator);
        assert_eq!(UserRole::from_admin_flag(false), UserRole::Standard);
        assert!(!UserRole::default().is_admin());
    }

    #[test]
    fn test_user_as_caller() {
        let user = User::new(
            UserId::new(4),
            UserSlug::new("root").unwrap(),
            UserRole::Administrator,
        );

        let caller = user.as_caller();
        assert_eq!(caller.user_id(), UserId::new(4));
        assert!(caller.is_admin());
    }

    #[test]
    fn test_slug_deserialization_validates() {
        let ok: Result<UserSlug, _> = serde_json::from_str("\"bob\"");
        assert!(ok.is_ok());

        let bad: Result<UserSlug, _> = serde_json::from_str("\"b o b\"");
        assert!(bad.is_err());
    }
}
