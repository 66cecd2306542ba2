//! Migrate command - applies, reverts or lists schema migrations

use clap::{Args, Subcommand};
use tracing::info;

use crate::infrastructure::storage::{close_pool, connect_pool, Migrator, PostgresMigrator};

#[derive(Debug, Args)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Revert the most recently applied migration
    Down,
    /// List migrations and whether each is applied
    Status,
}

/// Run a migration action against the configured database
pub async fn run(args: MigrateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let pool = connect_pool(&config.storage.postgres_config()?).await?;
    let migrator = PostgresMigrator::new(pool.clone());

    let result = execute(&migrator, args.action).await;
    close_pool(&pool).await;

    result
}

async fn execute(migrator: &PostgresMigrator, action: MigrateAction) -> anyhow::Result<()> {
    match action {
        MigrateAction::Up => {
            migrator.run().await?;
            info!(version = ?migrator.version().await?, "Schema is up to date");
        }
        MigrateAction::Down => {
            migrator.revert().await?;
            info!(version = ?migrator.version().await?, "Reverted latest migration");
        }
        MigrateAction::Status => {
            for (migration, applied) in migrator.status().await? {
                println!(
                    "{:>4}  {:<8}  {}",
                    migration.version,
                    if applied { "applied" } else { "pending" },
                    migration.description
                );
            }
        }
    }

    Ok(())
}
