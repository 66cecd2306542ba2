//! User repository trait

use async_trait::async_trait;

use super::entity::{User, UserId, UserPatch};
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Repository trait for user storage
///
/// Implementations must reject a second record with the same email or login
/// with `DomainError::Conflict`, even when the service-level pre-check passed.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// All users, most recently created first
    async fn find_all(&self) -> Result<Vec<User>, DomainError>;

    /// Get a user by ID
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Get a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Get a user by login
    async fn find_by_login(&self, login: &str) -> Result<Option<User>, DomainError>;

    /// Apply a partial update, returning the stored record or `None` if the ID is unknown
    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<Option<User>, DomainError>;

    /// Delete a user, returning whether a record was removed
    async fn delete(&self, id: &UserId) -> Result<bool, DomainError>;

    /// Check if a user with this email exists
    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError>;

    /// Check if a user with this login exists
    async fn exists_by_login(&self, login: &str) -> Result<bool, DomainError>;

    /// Verify the backing store is reachable
    async fn ping(&self) -> Result<(), DomainError> {
        Ok(())
    }
}
