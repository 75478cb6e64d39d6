pub mod repository;
pub mod schema;
pub mod sqlite;
pub mod value;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::DatabaseConfig;
use crate::error::Result;

/// Open a pooled SQLite database file (created if missing) and run migrations.
///
/// Pooled connections are retired after `pool_recycle_seconds` so that no
/// connection outlives the configured lifetime.
pub async fn connect_sqlite(config: &DatabaseConfig) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .max_lifetime(Some(Duration::from_secs(config.pool_recycle_seconds)))
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Open an in-memory SQLite database and run migrations. Useful for testing.
///
/// Every in-memory connection is its own database, so the pool holds exactly
/// one connection and never recycles it.
pub async fn connect_sqlite_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .max_lifetime(None)
        .idle_timeout(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let migrations: &[&str] = &[
        include_str!("../../../../migrations/sqlite/001_initial_schema.sql"),
        include_str!("../../../../migrations/sqlite/002_user_sessions.sql"),
    ];

    for migration_sql in migrations {
        for statement in migration_sql.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() && !trimmed.starts_with("PRAGMA") {
                sqlx::query(trimmed).execute(pool).await?;
            }
        }
    }
    Ok(())
}
