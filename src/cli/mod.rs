//! CLI module for the user management service
//!
//! Provides subcommands:
//! - `serve`: run the HTTP API (default deployment mode)
//! - `migrate`: apply, revert or inspect the PostgreSQL schema
//! - `seed`: insert the demo users

pub mod migrate;
pub mod seed;
pub mod serve;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::logging;

/// User management REST service
#[derive(Parser)]
#[command(name = "user-management-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API server
    Serve,

    /// Manage the PostgreSQL schema
    Migrate(migrate::MigrateArgs),

    /// Insert the demo users, skipping ones that already exist
    Seed,
}

/// Load `.env` and the layered configuration, then install logging.
/// Unreadable configuration falls back to defaults.
pub(crate) fn bootstrap() -> AppConfig {
    dotenvy::dotenv().ok();

    let (config, load_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    logging::init_logging(&config.logging);

    if let Some(e) = load_error {
        warn!("Failed to load configuration, using defaults: {}", e);
    }

    config
}
