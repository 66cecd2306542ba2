//! Demo user records for local environments

use tracing::{info, warn};

use crate::domain::user::{Gender, UserRepository, UserStatus};
use crate::domain::DomainError;

use super::dto::CreateUserRequest;
use super::service::UserService;

/// A demo user and the status it should end up in
#[derive(Debug, Clone)]
pub struct SeedUser {
    pub request: CreateUserRequest,
    pub status: UserStatus,
}

/// Outcome of a seeding run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
}

#[allow(clippy::too_many_arguments)]
fn seed(
    login: &str,
    first_name: &str,
    last_name: &str,
    middle_name: Option<&str>,
    gender: Gender,
    age: i32,
    phone: &str,
    email: &str,
    status: UserStatus,
) -> SeedUser {
    SeedUser {
        request: CreateUserRequest {
            login: login.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            middle_name: middle_name.map(String::from),
            gender,
            age,
            phone: Some(phone.to_string()),
            email: email.to_string(),
            avatar: Some(format!("https://example.com/avatars/{}.jpg", login)),
        },
        status,
    }
}

/// The fixed set of demo users
pub fn demo_users() -> Vec<SeedUser> {
    vec![
        seed(
            "john_doe",
            "John",
            "Doe",
            Some("Michael"),
            Gender::Male,
            30,
            "+1234567890",
            "john.doe@example.com",
            UserStatus::Active,
        ),
        seed(
            "jane_smith",
            "Jane",
            "Smith",
            None,
            Gender::Female,
            25,
            "+1234567891",
            "jane.smith@example.com",
            UserStatus::Active,
        ),
        seed(
            "alex_johnson",
            "Alex",
            "Johnson",
            Some("James"),
            Gender::Other,
            35,
            "+1234567892",
            "alex.johnson@example.com",
            UserStatus::Active,
        ),
        seed(
            "maria_garcia",
            "Maria",
            "Garcia",
            Some("Elena"),
            Gender::Female,
            28,
            "+1234567893",
            "maria.garcia@example.com",
            UserStatus::Inactive,
        ),
        seed(
            "david_wilson",
            "David",
            "Wilson",
            None,
            Gender::Male,
            42,
            "+1234567894",
            "david.wilson@example.com",
            UserStatus::Suspended,
        ),
    ]
}

/// Insert the demo users through the service, skipping any that already exist
pub async fn seed_users<R: UserRepository>(
    service: &UserService<R>,
) -> Result<SeedReport, DomainError> {
    let mut report = SeedReport::default();

    for seed in demo_users() {
        let login = seed.request.login.clone();

        let created = match service.create(seed.request).await {
            Ok(user) => user,
            Err(e) if e.is_conflict() => {
                warn!(login = %login, "Seed user already exists, skipping");
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        if seed.status != created.status {
            service.update_status(&created.id, seed.status).await?;
        }

        report.created += 1;
    }

    info!(
        created = report.created,
        skipped = report.skipped,
        "Seeded demo users"
    );

    Ok(report)
}
