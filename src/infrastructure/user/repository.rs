//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{User, UserId, UserPatch, UserRepository};
use crate::domain::DomainError;

/// Users plus the unique-key indexes, guarded by one lock so that the
/// uniqueness check and the write happen atomically.
#[derive(Debug, Default)]
struct UserStore {
    users: HashMap<UserId, User>,
    /// email -> user ID
    email_index: HashMap<String, UserId>,
    /// login -> user ID
    login_index: HashMap<String, UserId>,
}

impl UserStore {
    fn ensure_unique(
        &self,
        email: &str,
        login: &str,
        exclude: Option<&UserId>,
    ) -> Result<(), DomainError> {
        let taken_by_other = |owner: Option<&UserId>| match (owner, exclude) {
            (Some(owner), Some(exclude)) => owner != exclude,
            (Some(_), None) => true,
            (None, _) => false,
        };

        if taken_by_other(self.email_index.get(email)) {
            return Err(DomainError::conflict(
                "email",
                format!("User with email '{}' already exists", email),
            ));
        }

        if taken_by_other(self.login_index.get(login)) {
            return Err(DomainError::conflict(
                "login",
                format!("User with login '{}' already exists", login),
            ));
        }

        Ok(())
    }
}

/// In-memory implementation of UserRepository
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    store: Arc<RwLock<UserStore>>,
}

impl InMemoryUserRepository {
    /// Create a new empty repository
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut store = self.store.write().await;

        if store.users.contains_key(user.id()) {
            return Err(DomainError::conflict(
                "id",
                format!("User with ID '{}' already exists", user.id()),
            ));
        }

        store.ensure_unique(user.email(), user.login(), None)?;

        let id = *user.id();
        store.email_index.insert(user.email().to_string(), id);
        store.login_index.insert(user.login().to_string(), id);
        store.users.insert(id, user.clone());

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let store = self.store.read().await;

        let mut users: Vec<User> = store.users.values().cloned().collect();
        users.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });

        Ok(users)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;
        Ok(store.users.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;

        Ok(store
            .email_index
            .get(email)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, DomainError> {
        let store = self.store.read().await;

        Ok(store
            .login_index
            .get(login)
            .and_then(|id| store.users.get(id))
            .cloned())
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<Option<User>, DomainError> {
        let mut store = self.store.write().await;

        let Some(current) = store.users.get(id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        updated.apply(patch);

        store.ensure_unique(updated.email(), updated.login(), Some(id))?;

        let old_email = current.email().to_string();
        let old_login = current.login().to_string();

        if old_email != updated.email() {
            store.email_index.remove(&old_email);
            store.email_index.insert(updated.email().to_string(), *id);
        }

        if old_login != updated.login() {
            store.login_index.remove(&old_login);
            store.login_index.insert(updated.login().to_string(), *id);
        }

        store.users.insert(*id, updated.clone());

        Ok(Some(updated))
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;

        if let Some(user) = store.users.remove(id) {
            store.email_index.remove(user.email());
            store.login_index.remove(user.login());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        let store = self.store.read().await;
        Ok(store.email_index.contains_key(email))
    }

    async fn exists_by_login(&self, login: &str) -> Result<bool, DomainError> {
        let store = self.store.read().await;
        Ok(store.login_index.contains_key(login))
    }
}
