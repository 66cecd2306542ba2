//! Seed command - inserts the demo users into PostgreSQL

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::StorageBackend;
use crate::infrastructure::storage::{close_pool, connect_pool, run_user_migrations};
use crate::infrastructure::user::{seed_users, PostgresUserRepository, UserService};

/// Seed the configured database
pub async fn run() -> anyhow::Result<()> {
    let config = super::bootstrap();

    if config.storage.backend == StorageBackend::Memory {
        warn!("Storage backend is memory, nothing would persist; set storage.seed to seed on serve");
        return Ok(());
    }

    let pool = connect_pool(&config.storage.postgres_config()?).await?;

    let result = async {
        if config.storage.run_migrations {
            run_user_migrations(&pool).await?;
        }

        let service = UserService::new(Arc::new(PostgresUserRepository::new(pool.clone())));
        seed_users(&service).await
    }
    .await;

    close_pool(&pool).await;

    let report = result?;
    info!(created = report.created, skipped = report.skipped, "Seeding complete");

    Ok(())
}
