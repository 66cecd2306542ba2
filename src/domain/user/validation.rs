//! User validation utilities

use thiserror::Error;

/// Errors that can occur during user validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum UserValidationError {
    #[error("User ID '{0}' is not a valid UUID")]
    InvalidId(String),

    #[error("Age must be between {min} and {max}")]
    AgeOutOfRange { min: i32, max: i32 },

    #[error("Unknown gender '{0}'. Expected one of: male, female, other")]
    UnknownGender(String),

    #[error("Unknown status '{0}'. Expected one of: active, inactive, suspended")]
    UnknownStatus(String),
}

pub const MIN_AGE: i32 = 0;
pub const MAX_AGE: i32 = 150;

/// Validate an age
///
/// Bounds are inclusive on both ends.
pub fn validate_age(age: i32) -> Result<(), UserValidationError> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(UserValidationError::AgeOutOfRange {
            min: MIN_AGE,
            max: MAX_AGE,
        });
    }

    Ok(())
}
