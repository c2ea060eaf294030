//! SQLite connection pool management

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;

use super::repos::{DbError, DeviceRepo};

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Create a pool for the database file at `db_path`, creating the file
/// (and its parent directory) if missing.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the connection fails.
pub async fn create_pool(db_path: &Path) -> Result<SqlitePool, DbError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DbError::Sqlx(sqlx::Error::Io(e)))?;
        }
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5))
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Single-connection in-memory database (tests, throwaway servers).
///
/// The connection is never recycled: closing it would drop the database.
pub async fn create_memory_pool() -> Result<SqlitePool, DbError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create tables and seed the device lookup set. Safe to run repeatedly.
pub async fn bootstrap(pool: &SqlitePool) -> Result<(), DbError> {
    tracing::info!("Applying schema");
    sqlx::raw_sql(include_str!("schema.sql")).execute(pool).await?;
    DeviceRepo::new(pool).seed().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bootstrap_is_idempotent() {
        let pool = create_memory_pool().await.unwrap();
        bootstrap(&pool).await.unwrap();
        bootstrap(&pool).await.unwrap();

        let devices: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(devices, 2);
    }

    #[tokio::test]
    async fn file_pool_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("wallctl.db");

        let pool = create_pool(&path).await.unwrap();
        bootstrap(&pool).await.unwrap();

        assert!(path.exists());
    }
}
