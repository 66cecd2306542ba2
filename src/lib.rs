//! User Management API
//!
//! A REST service for managing user records:
//! - Create, read, update and delete users
//! - Unique email and login, bounded age, status lifecycle
//! - In-memory or PostgreSQL storage with versioned migrations

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use config::StorageBackend;
use infrastructure::storage::{connect_pool, run_user_migrations};
use infrastructure::user::{seed_users, InMemoryUserRepository, PostgresUserRepository, UserService};
use sqlx::PgPool;
use tracing::info;

/// Create the application state with the in-memory backend
pub async fn create_app_state() -> anyhow::Result<AppState> {
    let (state, _) = create_app_state_with_config(&AppConfig::default()).await?;
    Ok(state)
}

/// Create the application state with custom configuration.
/// Returns the connection pool when PostgreSQL backs the service so the
/// caller can close it on shutdown.
pub async fn create_app_state_with_config(
    config: &AppConfig,
) -> anyhow::Result<(AppState, Option<PgPool>)> {
    info!("Storage backend: {:?}", config.storage.backend);

    match config.storage.backend {
        StorageBackend::Memory => {
            let service = UserService::new(Arc::new(InMemoryUserRepository::new()));

            if config.storage.seed {
                seed_users(&service).await?;
            }

            Ok((AppState::new(Arc::new(service)), None))
        }
        StorageBackend::Postgres => {
            let pool = connect_pool(&config.storage.postgres_config()?).await?;
            info!("PostgreSQL connection established");

            if config.storage.run_migrations {
                run_user_migrations(&pool).await?;
            }

            let service = UserService::new(Arc::new(PostgresUserRepository::new(pool.clone())));

            if config.storage.seed {
                seed_users(&service).await?;
            }

            Ok((AppState::new(Arc::new(service)), Some(pool)))
        }
    }
}
