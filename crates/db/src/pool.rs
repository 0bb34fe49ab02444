//! Postgres connection pool for the worksite tables.

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::info;

use crate::DbError;

pub type DbPool = PgPool;

/// Connection settings, filled from the binary's configuration.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub database_url: String,
    pub max_connections: u32,
    /// Seconds a query waits for a free connection before failing.
    pub acquire_timeout_secs: u64,
}

/// Connect, tagging every session with `application_name = worksite`.
///
/// Only host and database name are logged; the URL may carry a password.
pub async fn create_pool(settings: &PoolSettings) -> Result<DbPool, DbError> {
    let options = PgConnectOptions::from_str(&settings.database_url)?.application_name("worksite");
    info!(
        host = options.get_host(),
        database = options.get_database().unwrap_or("-"),
        max_connections = settings.max_connections,
        "Connecting to database"
    );

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Apply the schema embedded from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    let migrator = sqlx::migrate!("../../migrations");
    info!(known = migrator.iter().count(), "Running database migrations");
    migrator.run(pool).await?;
    Ok(())
}
