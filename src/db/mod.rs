pub mod collections;
pub mod models;
pub mod records;

use crate::config::DatabaseConfig;
use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

pub type DbPool = Pool<Sqlite>;

/// Create the parent directory of a file-backed SQLite URL
async fn ensure_parent_dir(database_url: &str) -> Result<()> {
    if let Some(path) = database_url.strip_prefix("sqlite:") {
        let path = path.trim_start_matches("//");
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path == ":memory:" {
            return Ok(());
        }
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
    }
    Ok(())
}

fn connect_options(database_url: &str) -> Result<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true))
}

/// Initialize database connection pool
pub async fn init_pool(database_url: &str) -> Result<DbPool> {
    ensure_parent_dir(database_url).await?;

    let pool = SqlitePool::connect_with(connect_options(database_url)?).await?;
    Ok(pool)
}

/// Initialize database connection pool with custom configuration
pub async fn init_pool_with_config(config: &DatabaseConfig) -> Result<DbPool> {
    ensure_parent_dir(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
        .connect_with(connect_options(&config.url)?)
        .await?;

    Ok(pool)
}

/// Run database migrations
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
