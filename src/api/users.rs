//! User management endpoints

use axum::{
    extract::{OriginalUri, Path, State},
    http::StatusCode,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{Gender, UserStatus};
use crate::domain::DomainError;
use crate::infrastructure::user::{CreateUserRequest, UpdateUserRequest, UserResponse};

static LOGIN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("login pattern is valid"));

static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]+$").expect("phone pattern is valid"));

/// Request to create a new user
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserApiRequest {
    #[validate(
        length(min = 3, max = 50, message = "Login must be between 3 and 50 characters"),
        regex(
            path = *LOGIN_PATTERN,
            message = "Login can only contain letters, numbers and underscores"
        )
    )]
    pub login: String,
    #[validate(length(min = 2, max = 100, message = "First name must be between 2 and 100 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100, message = "Last name must be between 2 and 100 characters"))]
    pub last_name: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 100, message = "Middle name must be between 1 and 100 characters"))]
    pub middle_name: Option<String>,
    pub gender: Gender,
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: i32,
    #[serde(default)]
    #[validate(
        length(min = 10, max = 20, message = "Phone must be between 10 and 20 characters"),
        regex(path = *PHONE_PATTERN, message = "Phone number has an invalid format")
    )]
    pub phone: Option<String>,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(min = 1, max = 255, message = "Avatar must be between 1 and 255 characters"))]
    pub avatar: Option<String>,
}

impl From<CreateUserApiRequest> for CreateUserRequest {
    fn from(request: CreateUserApiRequest) -> Self {
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

/// Request to update a user; omitted or null fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserApiRequest {
    #[validate(
        length(min = 3, max = 50, message = "Login must be between 3 and 50 characters"),
        regex(
            path = *LOGIN_PATTERN,
            message = "Login can only contain letters, numbers and underscores"
        )
    )]
    pub login: Option<String>,
    #[validate(length(min = 2, max = 100, message = "First name must be between 2 and 100 characters"))]
    pub first_name: Option<String>,
    #[validate(length(min = 2, max = 100, message = "Last name must be between 2 and 100 characters"))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Middle name must be between 1 and 100 characters"))]
    pub middle_name: Option<String>,
    pub gender: Option<Gender>,
    #[validate(range(min = 0, max = 150, message = "Age must be between 0 and 150"))]
    pub age: Option<i32>,
    #[validate(
        length(min = 10, max = 20, message = "Phone must be between 10 and 20 characters"),
        regex(path = *PHONE_PATTERN, message = "Phone number has an invalid format")
    )]
    pub phone: Option<String>,
    #[validate(email(message = "Email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255, message = "Avatar must be between 1 and 255 characters"))]
    pub avatar: Option<String>,
}

impl From<UpdateUserApiRequest> for UpdateUserRequest {
    fn from(request: UpdateUserApiRequest) -> Self {
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

/// Request to change a user's status
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusApiRequest {
    pub status: UserStatus,
}

fn at_path(uri: &OriginalUri) -> impl Fn(DomainError) -> ApiError + '_ {
    move |err| ApiError::from(err).at(uri.0.path())
}

fn validate<T: Validate>(request: &T, uri: &OriginalUri) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|errors| ApiError::from_validation(&errors).at(uri.0.path()))
}

/// POST /users
pub async fn create_user(
    State(state): State<AppState>,
    uri: OriginalUri,
    Json(request): Json<CreateUserApiRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    validate(&request, &uri)?;

    let user = state
        .user_service
        .create(request.into())
        .await
        .map_err(at_path(&uri))?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /users
pub async fn list_users(
    State(state): State<AppState>,
    uri: OriginalUri,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state
        .user_service
        .find_all()
        .await
        .map_err(at_path(&uri))?;

    Ok(Json(users))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .find_by_id(&id)
        .await
        .map_err(at_path(&uri))?;

    Ok(Json(user))
}

/// GET /users/email/{email}
pub async fn get_user_by_email(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(email): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .find_by_email(&email)
        .await
        .map_err(at_path(&uri))?;

    Ok(Json(user))
}

/// GET /users/login/{login}
pub async fn get_user_by_login(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(login): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .user_service
        .find_by_login(&login)
        .await
        .map_err(at_path(&uri))?;

    Ok(Json(user))
}

/// PATCH /users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<String>,
    Json(request): Json<UpdateUserApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    validate(&request, &uri)?;

    let user = state
        .user_service
        .update(&id, request.into())
        .await
        .map_err(at_path(&uri))?;

    Ok(Json(user))
}

/// PATCH /users/{id}/status
pub async fn update_user_status(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusApiRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    debug!(id = %id, status = %request.status, "Status change requested");

    let user = state
        .user_service
        .update_status(&id, request.status)
        .await
        .map_err(at_path(&uri))?;

    Ok(Json(user))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    uri: OriginalUri,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .delete(&id)
        .await
        .map_err(at_path(&uri))?;

    Ok(StatusCode::NO_CONTENT)
}
