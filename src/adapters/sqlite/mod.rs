//! SQLite persistence adapter: connection pooling, embedded migrations,
//! and the snapshot store.

pub mod connection;
pub mod migrations;
pub mod record_store;

pub use connection::{create_pool, create_test_pool, verify_connection, ConnectionError, PoolConfig};
pub use migrations::{all_embedded_migrations, Migration, MigrationError, Migrator};
pub use record_store::SqliteRecordStore;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::errors::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),
    #[error("migration error: {0}")]
    Migration(#[from] MigrationError),
}

/// Open the database at `url`, applying any pending embedded migrations.
pub async fn initialize_database(
    url: &str,
    config: PoolConfig,
) -> Result<SqlitePool, DatabaseError> {
    let pool = create_pool(url, Some(config)).await?;
    verify_connection(&pool).await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    Ok(pool)
}

/// In-memory pool with the full schema applied, for tests.
#[cfg(test)]
pub async fn create_migrated_test_pool() -> Result<SqlitePool, DatabaseError> {
    let pool = create_test_pool().await?;
    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await?;
    Ok(pool)
}

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|e| StoreError::Corrupt(format!("bad uuid {value}: {e}")))
}

pub(crate) fn parse_datetime(value: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp {value}: {e}")))
}

pub(crate) fn parse_json<T: DeserializeOwned>(value: &str) -> Result<T, StoreError> {
    serde_json::from_str(value).map_err(|e| StoreError::Corrupt(format!("bad json column: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_initialize_in_memory_database() {
        let pool = create_migrated_test_pool().await.unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pool_snapshots")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_parse_datetime_roundtrip() {
        let now = Utc::now();
        let parsed = parse_datetime(&now.to_rfc3339()).unwrap();
        assert_eq!(parsed, now);
    }

    #[test]
    fn test_parse_helpers_reject_garbage() {
        assert!(matches!(parse_uuid("nope"), Err(StoreError::Corrupt(_))));
        assert!(matches!(parse_datetime("nope"), Err(StoreError::Corrupt(_))));
        assert!(matches!(
            parse_json::<Vec<String>>("nope"),
            Err(StoreError::Corrupt(_))
        ));
    }
}
