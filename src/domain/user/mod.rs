//! User domain
//!
//! This module provides domain types and traits for user management,
//! including the user entity, derived name fields, validation, and the
//! repository trait the user service persists through.

mod entity;
mod repository;
mod validation;

pub use entity::{
    full_name, initials, timestamp_now, Gender, NewUser, User, UserId, UserPatch,
    UserStatus,
};
pub use repository::UserRepository;
pub use validation::{validate_age, UserValidationError, MAX_AGE, MIN_AGE};

#[cfg(test)]
pub use repository::MockUserRepository;
