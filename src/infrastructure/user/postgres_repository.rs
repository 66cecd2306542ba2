//! PostgreSQL user repository implementation

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::user::{timestamp_now, NewUser, User, UserId, UserPatch, UserRepository};
use crate::domain::DomainError;

/// Unique constraint names created by the users migration
pub const EMAIL_CONSTRAINT: &str = "uq_users_email";
pub const LOGIN_CONSTRAINT: &str = "uq_users_login";

/// Newest first; id breaks ties between equal timestamps
const LIST_ORDER: &str = "created_at DESC, id ASC";

const USER_COLUMNS: &str = "id, login, first_name, last_name, middle_name, gender::text AS gender, \
     age, phone, email, avatar, status::text AS status, created_at, updated_at";

/// PostgreSQL implementation of UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE {} = $1", USER_COLUMNS, column);

        let row = sqlx::query(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user by {}: {}", column, e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn exists(&self, column: &str, value: &str) -> Result<bool, DomainError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM users WHERE {} = $1)", column);

        sqlx::query_scalar(&sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to check user {}: {}", column, e)))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, DomainError> {
        let sql = format!(
            r#"
            INSERT INTO users (id, login, first_name, last_name, middle_name, gender, age,
                               phone, email, avatar, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6::user_gender, $7, $8, $9, $10, $11::user_status, $12, $13)
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(*user.id().as_uuid())
            .bind(user.login())
            .bind(user.first_name())
            .bind(user.last_name())
            .bind(user.middle_name())
            .bind(user.gender().as_str())
            .bind(user.age())
            .bind(user.phone())
            .bind(user.email())
            .bind(user.avatar())
            .bind(user.status().as_str())
            .bind(user.created_at())
            .bind(user.updated_at())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to create user"))?;

        row_to_user(&row)
    }

    async fn find_all(&self) -> Result<Vec<User>, DomainError> {
        let sql = format!("SELECT {} FROM users ORDER BY {}", USER_COLUMNS, LIST_ORDER);

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list users: {}", e)))?;

        rows.iter().map(row_to_user).collect()
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get user: {}", e)))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        self.find_one("email", email).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, DomainError> {
        self.find_one("login", login).await
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<Option<User>, DomainError> {
        let sql = format!(
            r#"
            UPDATE users
            SET login = COALESCE($2, login),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                middle_name = COALESCE($5, middle_name),
                gender = COALESCE($6::user_gender, gender),
                age = COALESCE($7, age),
                phone = COALESCE($8, phone),
                email = COALESCE($9, email),
                avatar = COALESCE($10, avatar),
                status = COALESCE($11::user_status, status),
                updated_at = GREATEST($12, updated_at + INTERVAL '1 microsecond')
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .bind(patch.login)
            .bind(patch.first_name)
            .bind(patch.last_name)
            .bind(patch.middle_name)
            .bind(patch.gender.map(|g| g.as_str()))
            .bind(patch.age)
            .bind(patch.phone)
            .bind(patch.email)
            .bind(patch.avatar)
            .bind(patch.status.map(|s| s.as_str()))
            .bind(timestamp_now())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_write_error(e, "Failed to update user"))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn delete(&self, id: &UserId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete user: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, DomainError> {
        self.exists("email", email).await
    }

    async fn exists_by_login(&self, login: &str) -> Result<bool, DomainError> {
        self.exists("login", login).await
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

/// Translate a write failure, turning unique violations into conflicts
fn map_write_error(err: sqlx::Error, context: &str) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return conflict_for_constraint(db_err.constraint());
        }
    }

    DomainError::storage(format!("{}: {}", context, err))
}

fn conflict_for_constraint(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some(EMAIL_CONSTRAINT) => {
            DomainError::conflict("email", "User with this email already exists")
        }
        Some(LOGIN_CONSTRAINT) => {
            DomainError::conflict("login", "User with this login already exists")
        }
        _ => DomainError::conflict("id", "User already exists"),
    }
}

/// Enum text read back from the database; a mismatch means the schema drifted
fn parse_stored<T>(value: &str, column: &str) -> Result<T, DomainError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| DomainError::internal(format!("Invalid {} in database: {}", column, e)))
}

fn row_to_user(row: &PgRow) -> Result<User, DomainError> {
    let column_error = |e: sqlx::Error| DomainError::storage(format!("Invalid user row: {}", e));

    let id: Uuid = row.try_get("id").map_err(column_error)?;
    let gender: String = row.try_get("gender").map_err(column_error)?;
    let status: String = row.try_get("status").map_err(column_error)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(column_error)?;
    let updated_at: DateTime<Utc> = row.try_get("updated_at").map_err(column_error)?;

    let fields = NewUser {
        login: row.try_get("login").map_err(column_error)?,
        first_name: row.try_get("first_name").map_err(column_error)?,
        last_name: row.try_get("last_name").map_err(column_error)?,
        middle_name: row.try_get("middle_name").map_err(column_error)?,
        gender: parse_stored(&gender, "gender")?,
        age: row.try_get("age").map_err(column_error)?,
        phone: row.try_get("phone").map_err(column_error)?,
        email: row.try_get("email").map_err(column_error)?,
        avatar: row.try_get("avatar").map_err(column_error)?,
    };

    let status = parse_stored(&status, "status")?;

    Ok(User::restore(
        UserId::from(id),
        fields,
        status,
        created_at,
        updated_at,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_for_email_constraint() {
        let err = conflict_for_constraint(Some(EMAIL_CONSTRAINT));
        assert!(matches!(err, DomainError::Conflict { ref field, .. } if field == "email"));
    }

    #[test]
    fn test_conflict_for_login_constraint() {
        let err = conflict_for_constraint(Some(LOGIN_CONSTRAINT));
        assert!(matches!(err, DomainError::Conflict { ref field, .. } if field == "login"));
    }

    #[test]
    fn test_conflict_for_unknown_constraint() {
        let err = conflict_for_constraint(None);
        assert!(matches!(err, DomainError::Conflict { ref field, .. } if field == "id"));
    }

    #[test]
    fn test_non_database_error_is_storage() {
        let err = map_write_error(sqlx::Error::RowNotFound, "Failed to update user");
        assert!(matches!(err, DomainError::Storage { .. }));
        assert!(err.message().starts_with("Failed to update user"));
    }

    #[test]
    fn test_unknown_stored_enum_is_internal() {
        let err = parse_stored::<crate::domain::user::UserStatus>("deleted", "status").unwrap_err();
        assert!(matches!(err, DomainError::Internal { .. }));
        assert!(err.message().contains("status"));

        let gender: crate::domain::user::Gender = parse_stored("female", "gender").unwrap();
        assert_eq!(gender, crate::domain::user::Gender::Female);
    }

    #[test]
    fn test_list_order_has_tie_break() {
        assert_eq!(LIST_ORDER, "created_at DESC, id ASC");
    }

    #[test]
    fn test_enum_columns_read_as_text() {
        assert!(USER_COLUMNS.contains("gender::text AS gender"));
        assert!(USER_COLUMNS.contains("status::text AS status"));
    }
}
