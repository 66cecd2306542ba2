//! Request and response types spoken by the user service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::{Gender, NewUser, User, UserPatch, UserStatus};

/// Request for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUserRequest {
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub gender: Gender,
    pub age: i32,
    pub phone: Option<String>,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<CreateUserRequest> for NewUser {
    fn from(request: CreateUserRequest) -> Self {
        Self {
            login: request.login,
            first_name: request.first_name,
            last_name: request.last_name,
            middle_name: request.middle_name,
            gender: request.gender,
            age: request.age,
            phone: request.phone,
            email: request.email,
            avatar: request.avatar,
        }
    }
}

/// Request for updating a user; absent fields are left unchanged
#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            login: request.login,
            first_name: request.first_name,
            last_name: request.last_name,
            middle_name: request.middle_name,
            gender: request.gender,
            age: request.age,
            phone: request.phone,
            email: request.email,
            avatar: request.avatar,
            status: None,
        }
    }
}

/// User as returned to callers, including derived name fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub full_name: String,
    pub initials: String,
    pub gender: Gender,
    pub age: i32,
    pub phone: Option<String>,
    pub email: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: UserStatus,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            login: user.login().to_string(),
            first_name: user.first_name().to_string(),
            last_name: user.last_name().to_string(),
            middle_name: user.middle_name().map(String::from),
            full_name: user.full_name(),
            initials: user.initials(),
            gender: user.gender(),
            age: user.age(),
            phone: user.phone().map(String::from),
            email: user.email().to_string(),
            avatar: user.avatar().map(String::from),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
            status: user.status(),
        }
    }
}
