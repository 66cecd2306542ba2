//! Application state for shared services

use std::sync::Arc;

use crate::domain::user::{UserRepository, UserStatus};
use crate::domain::DomainError;
use crate::infrastructure::user::{CreateUserRequest, UpdateUserRequest, UserResponse, UserService};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
}

impl AppState {
    pub fn new(user_service: Arc<dyn UserServiceTrait>) -> Self {
        Self { user_service }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError>;
    async fn find_all(&self) -> Result<Vec<UserResponse>, DomainError>;
    async fn find_by_id(&self, id: &str) -> Result<UserResponse, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<UserResponse, DomainError>;
    async fn find_by_login(&self, login: &str) -> Result<UserResponse, DomainError>;
    async fn update(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError>;
    async fn update_status(
        &self,
        id: &str,
        status: UserStatus,
    ) -> Result<UserResponse, DomainError>;
    async fn delete(&self, id: &str) -> Result<(), DomainError>;
    /// Verify the backing store is reachable
    async fn check_storage(&self) -> Result<(), DomainError>;
}

#[async_trait::async_trait]
impl<R: UserRepository + 'static> UserServiceTrait for UserService<R> {
    async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        UserService::create(self, request).await
    }

    async fn find_all(&self) -> Result<Vec<UserResponse>, DomainError> {
        UserService::find_all(self).await
    }

    async fn find_by_id(&self, id: &str) -> Result<UserResponse, DomainError> {
        UserService::find_by_id(self, id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<UserResponse, DomainError> {
        UserService::find_by_email(self, email).await
    }

    async fn find_by_login(&self, login: &str) -> Result<UserResponse, DomainError> {
        UserService::find_by_login(self, login).await
    }

    async fn update(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError> {
        UserService::update(self, id, request).await
    }

    async fn update_status(
        &self,
        id: &str,
        status: UserStatus,
    ) -> Result<UserResponse, DomainError> {
        UserService::update_status(self, id, status).await
    }

    async fn delete(&self, id: &str) -> Result<(), DomainError> {
        UserService::delete(self, id).await
    }

    async fn check_storage(&self) -> Result<(), DomainError> {
        UserService::check_storage(self).await
    }
}
