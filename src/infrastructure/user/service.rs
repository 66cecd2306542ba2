//! User service enforcing uniqueness and bounds rules for user management

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::user::{validate_age, User, UserId, UserPatch, UserRepository, UserStatus};
use crate::domain::DomainError;

use super::dto::{CreateUserRequest, UpdateUserRequest, UserResponse};

const EMAIL_TAKEN: &str = "User with this email already exists";
const LOGIN_TAKEN: &str = "User with this login already exists";

/// User service for managing user records
///
/// Rules are checked in a fixed order and the first violation is returned:
/// email uniqueness, then login uniqueness, then age bounds.
#[derive(Debug)]
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    /// Create a new user service
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Create a new user
    pub async fn create(&self, request: CreateUserRequest) -> Result<UserResponse, DomainError> {
        info!(login = %request.login, "Creating user");

        if self.repository.exists_by_email(&request.email).await? {
            warn!(login = %request.login, "Rejected user creation: email taken");
            return Err(DomainError::conflict("email", EMAIL_TAKEN));
        }

        if self.repository.exists_by_login(&request.login).await? {
            warn!(login = %request.login, "Rejected user creation: login taken");
            return Err(DomainError::conflict("login", LOGIN_TAKEN));
        }

        validate_age(request.age).map_err(|e| DomainError::invalid_argument("age", e.to_string()))?;

        let user = self.repository.create(User::new(request.into())).await?;

        info!(id = %user.id(), login = %user.login(), "User created");

        Ok(UserResponse::from(&user))
    }

    /// List all users, most recently created first
    pub async fn find_all(&self) -> Result<Vec<UserResponse>, DomainError> {
        let users = self.repository.find_all().await?;
        debug!(count = users.len(), "Listed users");

        Ok(users.iter().map(UserResponse::from).collect())
    }

    /// Get a user by ID
    pub async fn find_by_id(&self, id: &str) -> Result<UserResponse, DomainError> {
        debug!(id = %id, "Finding user by ID");

        let user = self.require(id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Get a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<UserResponse, DomainError> {
        debug!(email = %email, "Finding user by email");

        let user = self
            .repository
            .find_by_email(email)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User with email {} not found", email)))?;

        Ok(UserResponse::from(&user))
    }

    /// Get a user by login
    pub async fn find_by_login(&self, login: &str) -> Result<UserResponse, DomainError> {
        debug!(login = %login, "Finding user by login");

        let user = self
            .repository
            .find_by_login(login)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("User with login {} not found", login)))?;

        Ok(UserResponse::from(&user))
    }

    /// Apply a partial update to a user
    pub async fn update(
        &self,
        id: &str,
        request: UpdateUserRequest,
    ) -> Result<UserResponse, DomainError> {
        info!(id = %id, "Updating user");

        let existing = self.require(id).await?;

        if let Some(email) = request.email.as_deref() {
            if email != existing.email() && self.repository.exists_by_email(email).await? {
                warn!(id = %id, "Rejected user update: email taken");
                return Err(DomainError::conflict("email", EMAIL_TAKEN));
            }
        }

        if let Some(login) = request.login.as_deref() {
            if login != existing.login() && self.repository.exists_by_login(login).await? {
                warn!(id = %id, "Rejected user update: login taken");
                return Err(DomainError::conflict("login", LOGIN_TAKEN));
            }
        }

        if let Some(age) = request.age {
            validate_age(age).map_err(|e| DomainError::invalid_argument("age", e.to_string()))?;
        }

        let updated = self
            .repository
            .update(existing.id(), UserPatch::from(request))
            .await?
            .ok_or_else(|| not_found_by_id(id))?;

        Ok(UserResponse::from(&updated))
    }

    /// Set a user's status; any status may follow any other
    pub async fn update_status(
        &self,
        id: &str,
        status: UserStatus,
    ) -> Result<UserResponse, DomainError> {
        info!(id = %id, status = %status, "Updating user status");

        let existing = self.require(id).await?;

        let updated = self
            .repository
            .update(existing.id(), UserPatch::status(status))
            .await?
            .ok_or_else(|| not_found_by_id(id))?;

        Ok(UserResponse::from(&updated))
    }

    /// Hard-delete a user
    pub async fn delete(&self, id: &str) -> Result<(), DomainError> {
        info!(id = %id, "Deleting user");

        let user_id = parse_id(id)?;

        if !self.repository.delete(&user_id).await? {
            return Err(not_found_by_id(id));
        }

        Ok(())
    }

    /// Check that the backing store answers
    pub async fn check_storage(&self) -> Result<(), DomainError> {
        self.repository.ping().await
    }

    async fn require(&self, id: &str) -> Result<User, DomainError> {
        let user_id = parse_id(id)?;

        self.repository
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| not_found_by_id(id))
    }
}

/// An ID that is not a UUID cannot name a stored user
fn parse_id(id: &str) -> Result<UserId, DomainError> {
    UserId::parse(id).map_err(|_| not_found_by_id(id))
}

fn not_found_by_id(id: &str) -> DomainError {
    DomainError::not_found(format!("User with ID {} not found", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use mockall::predicate::eq;

    use crate::domain::user::{Gender, MockUserRepository, NewUser};
    use crate::infrastructure::user::repository::InMemoryUserRepository;

    fn create_service() -> UserService<InMemoryUserRepository> {
        UserService::new(Arc::new(InMemoryUserRepository::new()))
    }

    fn make_request(login: &str, email: &str, age: i32) -> CreateUserRequest {
        CreateUserRequest {
            login: login.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            middle_name: Some("Michael".to_string()),
            gender: Gender::Male,
            age,
            phone: Some("+1234567890".to_string()),
            email: email.to_string(),
            avatar: Some("https://example.com/avatar.jpg".to_string()),
        }
    }

    fn stored_user(login: &str, email: &str) -> User {
        User::new(NewUser::from(make_request(login, email, 30)))
    }

    fn conflict_field(err: &DomainError) -> Option<&str> {
        match err {
            DomainError::Conflict { field, .. } => Some(field),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_create_user() {
        let service = create_service();

        let user = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        assert_eq!(user.login, "john_doe");
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.full_name, "John Doe");
        assert_eq!(user.initials, "JD");
        assert_eq!(user.created_at, user.updated_at);
    }

    #[tokio::test]
    async fn test_created_ids_are_unique() {
        let service = create_service();

        let a = service
            .create(make_request("user_a", "a@example.com", 20))
            .await
            .unwrap();
        let b = service
            .create(make_request("user_b", "b@example.com", 20))
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(b.status, UserStatus::Active);
    }

    #[tokio::test]
    async fn test_create_duplicate_email() {
        let service = create_service();
        service
            .create(make_request("first", "same@example.com", 30))
            .await
            .unwrap();

        let err = service
            .create(make_request("second", "same@example.com", 30))
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("email"));
    }

    #[tokio::test]
    async fn test_create_duplicate_login() {
        let service = create_service();
        service
            .create(make_request("same", "first@example.com", 30))
            .await
            .unwrap();

        let err = service
            .create(make_request("same", "second@example.com", 30))
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("login"));
    }

    #[tokio::test]
    async fn test_email_conflict_reported_before_login_conflict() {
        let service = create_service();
        service
            .create(make_request("same", "same@example.com", 30))
            .await
            .unwrap();

        let err = service
            .create(make_request("same", "same@example.com", 30))
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("email"));
    }

    #[tokio::test]
    async fn test_create_age_bounds() {
        let service = create_service();

        for age in [-1, 151] {
            let err = service
                .create(make_request(&format!("age_{}", age + 1), &format!("{}@x.com", age), age))
                .await
                .unwrap_err();
            assert!(matches!(err, DomainError::InvalidArgument { ref field, .. } if field == "age"));
        }

        for age in [0, 150] {
            let user = service
                .create(make_request(&format!("age_{}", age), &format!("{}@x.com", age), age))
                .await
                .unwrap();
            assert_eq!(user.age, age);
        }
    }

    #[tokio::test]
    async fn test_uniqueness_checked_before_age() {
        let service = create_service();
        service
            .create(make_request("taken", "taken@example.com", 30))
            .await
            .unwrap();

        let err = service
            .create(make_request("fresh", "taken@example.com", 200))
            .await
            .unwrap_err();

        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn test_create_skips_login_check_when_email_taken() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email()
            .with(eq("taken@example.com"))
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_exists_by_login().never();
        repo.expect_create().never();

        let service = UserService::new(Arc::new(repo));
        let err = service
            .create(make_request("anyone", "taken@example.com", 30))
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("email"));
    }

    #[tokio::test]
    async fn test_create_does_not_persist_invalid_age() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_exists_by_login().returning(|_| Ok(false));
        repo.expect_create().never();

        let service = UserService::new(Arc::new(repo));
        let err = service
            .create(make_request("someone", "someone@example.com", -5))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidArgument { .. }));
    }

    #[tokio::test]
    async fn test_create_surfaces_storage_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_exists_by_email().returning(|_| Ok(false));
        repo.expect_exists_by_login().returning(|_| Ok(false));
        repo.expect_create()
            .times(1)
            .returning(|_| Err(DomainError::conflict("email", EMAIL_TAKEN)));

        let service = UserService::new(Arc::new(repo));
        let err = service
            .create(make_request("racer", "race@example.com", 30))
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("email"));
    }

    #[tokio::test]
    async fn test_find_operations() {
        let service = create_service();
        let created = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        assert_eq!(service.find_by_id(&created.id).await.unwrap(), created);
        assert_eq!(
            service.find_by_email("john.doe@example.com").await.unwrap(),
            created
        );
        assert_eq!(service.find_by_login("john_doe").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_find_missing() {
        let service = create_service();

        let missing_id = UserId::generate().to_string();
        assert!(service.find_by_id(&missing_id).await.unwrap_err().is_not_found());
        assert!(service.find_by_id("not-a-uuid").await.unwrap_err().is_not_found());
        assert!(service
            .find_by_email("nobody@example.com")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(service.find_by_login("nobody").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let service = create_service();

        for login in ["first", "second", "third"] {
            service
                .create(make_request(login, &format!("{}@example.com", login), 30))
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let users = service.find_all().await.unwrap();
        let logins: Vec<&str> = users.iter().map(|u| u.login.as_str()).collect();
        assert_eq!(logins, vec!["third", "second", "first"]);

        for user in &users {
            assert_eq!(user.full_name, format!("{} {}", user.first_name, user.last_name));
        }
    }

    #[tokio::test]
    async fn test_update_fields_recomputes_derived() {
        let service = create_service();
        let created = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateUserRequest {
                    first_name: Some("alice".to_string()),
                    last_name: Some("walker".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.full_name, "alice walker");
        assert_eq!(updated.initials, "AW");
        assert_eq!(updated.login, "john_doe");
        assert!(updated.updated_at > created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_email_to_other_users_email() {
        let service = create_service();
        service
            .create(make_request("first", "first@example.com", 30))
            .await
            .unwrap();
        let second = service
            .create(make_request("second", "second@example.com", 30))
            .await
            .unwrap();

        let err = service
            .update(
                &second.id,
                UpdateUserRequest {
                    email: Some("first@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("email"));
    }

    #[tokio::test]
    async fn test_update_login_to_other_users_login() {
        let service = create_service();
        service
            .create(make_request("first", "first@example.com", 30))
            .await
            .unwrap();
        let second = service
            .create(make_request("second", "second@example.com", 30))
            .await
            .unwrap();

        let err = service
            .update(
                &second.id,
                UpdateUserRequest {
                    login: Some("first".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert_eq!(conflict_field(&err), Some("login"));
    }

    #[tokio::test]
    async fn test_update_own_email_and_login_is_not_a_conflict() {
        let service = create_service();
        let created = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        let updated = service
            .update(
                &created.id,
                UpdateUserRequest {
                    email: Some("john.doe@example.com".to_string()),
                    login: Some("john_doe".to_string()),
                    age: Some(31),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.age, 31);
    }

    #[tokio::test]
    async fn test_update_own_email_skips_exists_check() {
        let existing = stored_user("john_doe", "john.doe@example.com");
        let id = *existing.id();

        let mut repo = MockUserRepository::new();
        let found = existing.clone();
        repo.expect_find_by_id()
            .with(eq(id))
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_exists_by_email().never();
        repo.expect_exists_by_login().never();
        repo.expect_update().times(1).returning(move |_, patch| {
            let mut user = existing.clone();
            user.apply(patch);
            Ok(Some(user))
        });

        let service = UserService::new(Arc::new(repo));
        let updated = service
            .update(
                &id.to_string(),
                UpdateUserRequest {
                    email: Some("john.doe@example.com".to_string()),
                    login: Some("john_doe".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.email, "john.doe@example.com");
    }

    #[tokio::test]
    async fn test_update_invalid_age_keeps_stored_age() {
        let service = create_service();
        let created = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        let err = service
            .update(
                &created.id,
                UpdateUserRequest {
                    age: Some(200),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::InvalidArgument { .. }));
        assert_eq!(service.find_by_id(&created.id).await.unwrap().age, 30);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let service = create_service();

        let err = service
            .update(&UserId::generate().to_string(), UpdateUserRequest::default())
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_record_vanished_between_steps() {
        let existing = stored_user("ghost", "ghost@example.com");
        let id = *existing.id();

        let mut repo = MockUserRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_update().returning(|_, _| Ok(None));

        let service = UserService::new(Arc::new(repo));

        let err = service
            .update(&id.to_string(), UpdateUserRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service
            .update_status(&id.to_string(), UserStatus::Inactive)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_status_any_transition() {
        let service = create_service();
        let created = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        let mut last_updated = created.updated_at;
        for status in [
            UserStatus::Suspended,
            UserStatus::Inactive,
            UserStatus::Active,
            UserStatus::Suspended,
        ] {
            let user = service.update_status(&created.id, status).await.unwrap();
            assert_eq!(user.status, status);
            assert!(user.updated_at > last_updated);
            last_updated = user.updated_at;
        }
    }

    #[tokio::test]
    async fn test_update_status_missing_user() {
        let service = create_service();

        let err = service
            .update_status(&UserId::generate().to_string(), UserStatus::Inactive)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let service = create_service();
        let created = service
            .create(make_request("john_doe", "john.doe@example.com", 30))
            .await
            .unwrap();

        service.delete(&created.id).await.unwrap();

        assert!(service.find_by_id(&created.id).await.unwrap_err().is_not_found());
        assert!(service.delete(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete_missing_user() {
        let service = create_service();

        let err = service
            .delete(&UserId::generate().to_string())
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let err = service.delete("garbage").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_storage_errors_propagate() {
        let mut repo = MockUserRepository::new();
        repo.expect_find_all()
            .returning(|| Err(DomainError::storage("connection reset")));

        let service = UserService::new(Arc::new(repo));
        let err = service.find_all().await.unwrap_err();

        assert!(matches!(err, DomainError::Storage { .. }));
    }

    #[tokio::test]
    async fn test_user_lifecycle_scenario() {
        let service = create_service();

        let a = service
            .create(make_request("a1", "a@x.com", 30))
            .await
            .unwrap();

        let err = service
            .create(make_request("b1", "a@x.com", 30))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let err = service
            .update(
                &a.id,
                UpdateUserRequest {
                    age: Some(200),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument { .. }));
        assert_eq!(service.find_by_id(&a.id).await.unwrap().age, 30);

        let suspended = service
            .update_status(&a.id, UserStatus::Suspended)
            .await
            .unwrap();
        assert_eq!(suspended.status, UserStatus::Suspended);
        assert!(suspended.updated_at > a.updated_at);

        service.delete(&a.id).await.unwrap();
        assert!(service.find_by_id(&a.id).await.unwrap_err().is_not_found());
    }
}
