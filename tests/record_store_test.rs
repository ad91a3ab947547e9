//! Durability tests for the SQLite store: snapshots, embeddings, and the
//! pinned dimension must survive process restarts (simulated by closing
//! and reopening a file-backed database).

use chrono::Utc;
use tempfile::TempDir;

use poolwatch::adapters::sqlite::{
    create_pool, initialize_database, Migrator, PoolConfig, SqliteRecordStore,
};
use poolwatch::domain::errors::StoreError;
use poolwatch::domain::models::{PoolRecord, RawPool};
use poolwatch::domain::ports::RecordStore;

const DIM: usize = 4;

fn db_url(dir: &TempDir) -> String {
    format!("sqlite://{}/pools.db", dir.path().display())
}

fn sample_record() -> PoolRecord {
    let raw = RawPool {
        pool: Some("sonic-pool-1".to_string()),
        chain: Some("Sonic".to_string()),
        project: Some("beets".to_string()),
        symbol: Some("S-USDC".to_string()),
        tvl_usd: Some(2_000_000.0),
        apy: Some(11.2),
        reward_tokens: Some(vec!["0xabc".to_string()]),
        ..RawPool::default()
    };
    PoolRecord::from_raw(raw, Utc::now()).with_embedding(Some(vec![0.5, 0.5, 0.5, 0.5]))
}

#[tokio::test]
async fn snapshots_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let url = db_url(&dir);

    let record = sample_record();
    {
        let pool = initialize_database(&url, PoolConfig::default())
            .await
            .unwrap();
        let store = SqliteRecordStore::new(pool, DIM);
        store.ensure_dimension().await.unwrap();
        store.upsert(&record).await.unwrap();
        store.close().await;
    }

    let pool = initialize_database(&url, PoolConfig::default())
        .await
        .unwrap();
    let store = SqliteRecordStore::new(pool, DIM);
    store.ensure_dimension().await.unwrap();

    let stored = store.list(None).await.unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].id, record.id);
    assert_eq!(stored[0].pool_id, "sonic-pool-1");
    assert_eq!(stored[0].reward_tokens, vec!["0xabc".to_string()]);
    assert_eq!(stored[0].embedding, record.embedding);
    assert_eq!(stored[0].observed_at.timestamp_micros(), record.observed_at.timestamp_micros());
}

#[tokio::test]
async fn migrations_are_idempotent_across_reopens() {
    let dir = TempDir::new().unwrap();
    let url = db_url(&dir);

    for _ in 0..3 {
        let pool = initialize_database(&url, PoolConfig::default())
            .await
            .unwrap();
        pool.close().await;
    }

    // Migration bookkeeping records each version exactly once.
    let pool = create_pool(&url, None).await.unwrap();
    let version = Migrator::new(pool.clone()).get_current_version().await.unwrap();
    assert_eq!(version, 1);
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn pinned_dimension_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let url = db_url(&dir);

    {
        let pool = initialize_database(&url, PoolConfig::default())
            .await
            .unwrap();
        let store = SqliteRecordStore::new(pool, DIM);
        store.ensure_dimension().await.unwrap();
        store.close().await;
    }

    // Reopening with a different configured dimension must fail fast.
    let pool = initialize_database(&url, PoolConfig::default())
        .await
        .unwrap();
    let store = SqliteRecordStore::new(pool, 1536);
    let err = store.ensure_dimension().await.unwrap_err();
    assert!(matches!(
        err,
        StoreError::SchemaMismatch {
            expected: DIM,
            actual: 1536
        }
    ));
}

#[tokio::test]
async fn search_works_on_reopened_database() {
    let dir = TempDir::new().unwrap();
    let url = db_url(&dir);

    {
        let pool = initialize_database(&url, PoolConfig::default())
            .await
            .unwrap();
        let store = SqliteRecordStore::new(pool, DIM);
        store.ensure_dimension().await.unwrap();
        store.upsert(&sample_record()).await.unwrap();
        store.close().await;
    }

    let pool = initialize_database(&url, PoolConfig::default())
        .await
        .unwrap();
    let store = SqliteRecordStore::new(pool, DIM);
    store.ensure_dimension().await.unwrap();

    let results = store
        .search(&[0.5, 0.5, 0.5, 0.5], 0.9, 10)
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!((results[0].similarity - 1.0).abs() < 1e-6);
}
