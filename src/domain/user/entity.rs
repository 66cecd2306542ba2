//! User entity and related types

use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::UserValidationError;

/// User identifier - system generated UUID, immutable after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a fresh identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identifier from its string form
    pub fn parse(id: &str) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId(id.to_string()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gender of a user
///
/// Storage defaults to `Other` when no value is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }
}

impl FromStr for Gender {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            "other" => Ok(Self::Other),
            other => Err(UserValidationError::UnknownGender(other.to_string())),
        }
    }
}

/// Status of a user account
///
/// Every status is reachable from every other status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Suspended => "suspended",
        }
    }
}

impl FromStr for UserStatus {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "suspended" => Ok(Self::Suspended),
            other => Err(UserValidationError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Caller-supplied fields of a user, everything except system fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
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

/// Partial update of a user. `None` leaves the current value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub login: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub middle_name: Option<String>,
    pub gender: Option<Gender>,
    pub age: Option<i32>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
    pub status: Option<UserStatus>,
}

impl UserPatch {
    /// Patch that only changes the status
    pub fn status(status: UserStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}

/// User entity
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserId,
    login: String,
    first_name: String,
    last_name: String,
    middle_name: Option<String>,
    gender: Gender,
    age: i32,
    phone: Option<String>,
    email: String,
    avatar: Option<String>,
    status: UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new active user with a fresh identifier
    pub fn new(fields: NewUser) -> Self {
        let now = timestamp_now();
        Self::restore(UserId::generate(), fields, UserStatus::Active, now, now)
    }

    /// Rebuild a user from persisted state
    pub fn restore(
        id: UserId,
        fields: NewUser,
        status: UserStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            login: fields.login,
            first_name: fields.first_name,
            last_name: fields.last_name,
            middle_name: fields.middle_name,
            gender: fields.gender,
            age: fields.age,
            phone: fields.phone,
            email: fields.email,
            avatar: fields.avatar,
            status,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn login(&self) -> &str {
        &self.login
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn middle_name(&self) -> Option<&str> {
        self.middle_name.as_deref()
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn age(&self) -> i32 {
        self.age
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn avatar(&self) -> Option<&str> {
        self.avatar.as_deref()
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Derived

    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }

    pub fn initials(&self) -> String {
        initials(&self.first_name, &self.last_name)
    }

    // Mutators

    /// Apply a partial update and refresh `updated_at`
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(login) = patch.login {
            self.login = login;
        }
        if let Some(first_name) = patch.first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            self.last_name = last_name;
        }
        if let Some(middle_name) = patch.middle_name {
            self.middle_name = Some(middle_name);
        }
        if let Some(gender) = patch.gender {
            self.gender = gender;
        }
        if let Some(age) = patch.age {
            self.age = age;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone);
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(avatar) = patch.avatar {
            self.avatar = Some(avatar);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }

        self.touch();
    }

    fn touch(&mut self) {
        let now = timestamp_now();

        // Keep updated_at monotonic even if the clock stalls
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + chrono::Duration::microseconds(1)
        };
    }
}

/// Current time at the microsecond precision storage keeps
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// `first_name + " " + last_name`, trimmed
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name).trim().to_string()
}

/// Uppercased first letters of first and last name
pub fn initials(first_name: &str, last_name: &str) -> String {
    first_name
        .chars()
        .take(1)
        .chain(last_name.chars().take(1))
        .flat_map(char::to_uppercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(login: &str, email: &str) -> NewUser {
        NewUser {
            login: login.to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            middle_name: Some("Michael".to_string()),
            gender: Gender::Male,
            age: 30,
            phone: Some("+1234567890".to_string()),
            email: email.to_string(),
            avatar: None,
        }
    }

    #[test]
    fn test_user_id_parse() {
        let id = UserId::generate();
        let parsed = UserId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_user_id_invalid() {
        assert_eq!(
            UserId::parse("not-a-uuid"),
            Err(UserValidationError::InvalidId("not-a-uuid".to_string()))
        );
        assert!(UserId::parse("").is_err());
    }

    #[test]
    fn test_gender_from_str() {
        assert_eq!("male".parse::<Gender>().unwrap(), Gender::Male);
        assert_eq!("female".parse::<Gender>().unwrap(), Gender::Female);
        assert_eq!("other".parse::<Gender>().unwrap(), Gender::Other);
        assert!("Male".parse::<Gender>().is_err());
        assert_eq!(Gender::default(), Gender::Other);
    }

    #[test]
    fn test_status_from_str() {
        for status in [UserStatus::Active, UserStatus::Inactive, UserStatus::Suspended] {
            assert_eq!(status.as_str().parse::<UserStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Suspended).unwrap(),
            "\"suspended\""
        );
        let status: UserStatus = serde_json::from_str("\"inactive\"").unwrap();
        assert_eq!(status, UserStatus::Inactive);
    }

    #[test]
    fn test_user_creation() {
        let user = User::new(new_user("john_doe", "john@example.com"));

        assert_eq!(user.login(), "john_doe");
        assert_eq!(user.email(), "john@example.com");
        assert_eq!(user.status(), UserStatus::Active);
        assert_eq!(user.created_at(), user.updated_at());
        assert_eq!(user.middle_name(), Some("Michael"));
    }

    #[test]
    fn test_user_ids_are_unique() {
        let a = User::new(new_user("a_user", "a@example.com"));
        let b = User::new(new_user("b_user", "b@example.com"));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_derived_fields() {
        let user = User::new(new_user("john_doe", "john@example.com"));
        assert_eq!(user.full_name(), "John Doe");
        assert_eq!(user.initials(), "JD");
    }

    #[test]
    fn test_full_name_is_trimmed() {
        assert_eq!(full_name("  Ann", "Lee  "), "Ann Lee");
        assert_eq!(full_name("Ann", ""), "Ann");
    }

    #[test]
    fn test_initials_uppercased() {
        assert_eq!(initials("jane", "smith"), "JS");
        assert_eq!(initials("élodie", "ñandú"), "ÉÑ");
        assert_eq!(initials("", "smith"), "S");
    }

    #[test]
    fn test_apply_patch() {
        let mut user = User::new(new_user("john_doe", "john@example.com"));
        let before = user.updated_at();

        user.apply(UserPatch {
            first_name: Some("jack".to_string()),
            age: Some(31),
            ..Default::default()
        });

        assert_eq!(user.first_name(), "jack");
        assert_eq!(user.age(), 31);
        assert_eq!(user.login(), "john_doe");
        assert_eq!(user.initials(), "JD");
        assert!(user.updated_at() > before);
        assert_eq!(user.created_at(), before);
    }

    #[test]
    fn test_apply_status_patch() {
        let mut user = User::new(new_user("john_doe", "john@example.com"));

        user.apply(UserPatch::status(UserStatus::Suspended));
        assert_eq!(user.status(), UserStatus::Suspended);

        user.apply(UserPatch::status(UserStatus::Active));
        assert_eq!(user.status(), UserStatus::Active);
    }

    #[test]
    fn test_timestamps_have_microsecond_precision() {
        let mut user = User::new(new_user("john_doe", "john@example.com"));
        assert_eq!(user.created_at().timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(user.created_at(), user.updated_at());

        user.apply(UserPatch::status(UserStatus::Inactive));
        assert_eq!(user.updated_at().timestamp_subsec_nanos() % 1_000, 0);
    }
}
