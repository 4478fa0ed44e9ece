//! User domain
//!
//! Identity types consumed by the API key lifecycle: users, roles, slugs
//! and the caller identity attached to every operation.

mod entity;
mod repository;
mod validation;

pub use entity::{Caller, User, UserId, UserRole, UserSlug};
pub use repository::UserRepository;
pub use validation::{validate_slug, UserValidationError};
