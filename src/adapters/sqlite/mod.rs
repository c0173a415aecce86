//! SQLite database adapters for the automation engine.
//!
//! One pool serves the whole audit surface (workflows, executions, log
//! entries). WAL journaling with a busy timeout keeps the CLI and a
//! dispatching process from tripping over each other.

pub mod execution_repository;
pub mod log_repository;
pub mod migrations;
pub mod workflow_repository;

pub use execution_repository::SqliteExecutionRepository;
pub use log_repository::SqliteLogRepository;
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use workflow_repository::SqliteWorkflowRepository;

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Invalid database URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to create database directory: {0}")]
    DirectoryCreation(#[source] std::io::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),
    #[error("Query error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Open the pool and bring the schema up to date.
pub async fn initialize_database(database_url: &str) -> Result<SqlitePool, DatabaseError> {
    ensure_database_directory(database_url)?;

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|_| DatabaseError::InvalidUrl(database_url.to_string()))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(DEFAULT_MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

/// Pool over the standard on-disk location used by the CLI.
pub async fn initialize_default_database() -> Result<SqlitePool, DatabaseError> {
    initialize_database("sqlite:.reviewflow/reviewflow.db").await
}

/// In-memory pool with all migrations applied. Capped at one connection so
/// every handle sees the same shared-cache database.
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|_| DatabaseError::InvalidUrl("sqlite::memory:".to_string()))?
        .foreign_keys(true)
        .shared_cache(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    let migrator = Migrator::new(pool.clone());
    migrator.run_embedded_migrations(all_embedded_migrations()).await?;
    Ok(pool)
}

fn ensure_database_directory(database_url: &str) -> Result<(), DatabaseError> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))
        .unwrap_or(database_url);

    if path == ":memory:" || path.is_empty() {
        return Ok(());
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent).map_err(DatabaseError::DirectoryCreation)?;
        }
    }
    Ok(())
}

/// Parse a UUID string from a SQLite row field.
pub fn parse_uuid(s: &str) -> DomainResult<Uuid> {
    Uuid::parse_str(s).map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an optional UUID string from a SQLite row field.
pub fn parse_optional_uuid(s: Option<String>) -> DomainResult<Option<Uuid>> {
    s.map(|s| Uuid::parse_str(&s))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

/// Parse an RFC3339 datetime string from a SQLite row field.
pub fn parse_datetime(s: &str) -> DomainResult<DateTime<Utc>> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map_err(|e| DomainError::SerializationError(e.to_string()))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse an optional RFC3339 datetime string from a SQLite row field.
pub fn parse_optional_datetime(s: Option<String>) -> DomainResult<Option<DateTime<Utc>>> {
    s.map(|s| chrono::DateTime::parse_from_rfc3339(&s).map(|d| d.with_timezone(&Utc)))
        .transpose()
        .map_err(|e| DomainError::SerializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrated_test_pool_is_usable() {
        let pool = create_migrated_test_pool().await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workflows")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_ensure_directory_skips_memory_urls() {
        assert!(ensure_database_directory("sqlite::memory:").is_ok());
        assert!(ensure_database_directory("sqlite:").is_ok());
    }

    #[test]
    fn test_parse_datetime_round_trip() {
        let now = Utc::now();
        let parsed = parse_datetime(&now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);

        assert!(parse_datetime("not a date").is_err());
    }
}
