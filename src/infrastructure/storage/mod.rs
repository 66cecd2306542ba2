//! Storage infrastructure - PostgreSQL pool and schema migrations

pub mod migrations;
mod postgres;

pub use migrations::{run_user_migrations, user_migrations, Migration, Migrator, PostgresMigrator};
pub use postgres::{close_pool, connect_pool, PostgresConfig};
