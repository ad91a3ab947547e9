//! SQLite implementation of the `RecordStore`.
//!
//! Snapshots live in a single `pool_snapshots` table; embeddings are stored
//! as little-endian f32 BLOBs in a nullable column. The expected vector
//! dimension is pinned in `store_meta` when the store is first created and
//! verified on every startup, so a misconfigured provider fails fast
//! instead of corrupting the index at write time.

use async_trait::async_trait;
use chrono::SecondsFormat;
use sqlx::SqlitePool;

use crate::domain::errors::StoreError;
use crate::domain::models::{PoolRecord, ScoredRecord};
use crate::domain::ports::RecordStore;

const DIMENSION_KEY: &str = "embedding_dimension";

/// Similarity assigned to degenerate comparisons (length mismatch, zero
/// magnitude). Below any threshold in [0, 1], so such rows never match.
const DEGENERATE_SIMILARITY: f32 = f32::MIN;

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
    dimension: usize,
}

impl SqliteRecordStore {
    pub fn new(pool: SqlitePool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    /// Pin or verify the store's embedding dimension.
    ///
    /// On first use the configured dimension is written to `store_meta`;
    /// afterwards a differing configured dimension is a fatal
    /// [`StoreError::SchemaMismatch`] — the stored vectors would be
    /// incomparable with newly written ones.
    pub async fn ensure_dimension(&self) -> Result<(), StoreError> {
        let stored: Option<(String,)> =
            sqlx::query_as("SELECT value FROM store_meta WHERE key = ?")
                .bind(DIMENSION_KEY)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            None => {
                sqlx::query("INSERT INTO store_meta (key, value) VALUES (?, ?)")
                    .bind(DIMENSION_KEY)
                    .bind(self.dimension.to_string())
                    .execute(&self.pool)
                    .await?;
                Ok(())
            }
            Some((value,)) => {
                let pinned: usize = value
                    .parse()
                    .map_err(|_| StoreError::Corrupt(format!("bad {DIMENSION_KEY}: {value}")))?;
                if pinned == self.dimension {
                    Ok(())
                } else {
                    Err(StoreError::SchemaMismatch {
                        expected: pinned,
                        actual: self.dimension,
                    })
                }
            }
        }
    }

    /// The dimension every written embedding must match.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn bytes_to_embedding(bytes: &[u8]) -> Result<Vec<f32>, StoreError> {
        if bytes.len() % 4 != 0 {
            return Err(StoreError::Corrupt(format!(
                "embedding blob length {} not a multiple of 4",
                bytes.len()
            )));
        }
        Ok(bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect())
    }

    /// Cosine similarity (`1 - cosine_distance`) between two vectors.
    ///
    /// Degenerate inputs get [`DEGENERATE_SIMILARITY`] so they fall below
    /// every valid threshold instead of being scored as zero.
    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return DEGENERATE_SIMILARITY;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if mag_a == 0.0 || mag_b == 0.0 {
            return DEGENERATE_SIMILARITY;
        }

        dot / (mag_a * mag_b)
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn upsert(&self, record: &PoolRecord) -> Result<(), StoreError> {
        let embedding_bytes = match &record.embedding {
            Some(vector) => {
                if vector.len() != self.dimension {
                    return Err(StoreError::SchemaMismatch {
                        expected: self.dimension,
                        actual: vector.len(),
                    });
                }
                Some(Self::embedding_to_bytes(vector))
            }
            None => None,
        };

        let reward_tokens = serde_json::to_string(&record.reward_tokens)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let predictions = serde_json::to_string(&record.predictions)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        sqlx::query(
            r#"INSERT INTO pool_snapshots (
                id, pool_id, chain, project, symbol,
                tvl_usd, apy, apy_base, apy_reward, apy_mean_30d,
                apy_pct_1d, apy_pct_7d, apy_pct_30d,
                reward_tokens, predictions, observed_at, created_at, embedding
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(record.id.to_string())
        .bind(&record.pool_id)
        .bind(&record.chain)
        .bind(&record.project)
        .bind(&record.symbol)
        .bind(record.tvl_usd)
        .bind(record.apy)
        .bind(record.apy_base)
        .bind(record.apy_reward)
        .bind(record.apy_mean_30d)
        .bind(record.apy_pct_1d)
        .bind(record.apy_pct_7d)
        .bind(record.apy_pct_30d)
        .bind(reward_tokens)
        .bind(predictions)
        .bind(record.observed_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(record.created_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .bind(embedding_bytes)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self, limit: Option<u32>) -> Result<Vec<PoolRecord>, StoreError> {
        let rows: Vec<SnapshotRow> = match limit {
            Some(n) => {
                sqlx::query_as(
                    "SELECT * FROM pool_snapshots ORDER BY created_at DESC LIMIT ?",
                )
                .bind(i64::from(n))
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as("SELECT * FROM pool_snapshots ORDER BY created_at DESC")
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn search(
        &self,
        query: &[f32],
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, StoreError> {
        // Rows without an embedding are excluded up front, never scored.
        let rows: Vec<SnapshotRow> =
            sqlx::query_as("SELECT * FROM pool_snapshots WHERE embedding IS NOT NULL")
                .fetch_all(&self.pool)
                .await?;

        let mut scored = Vec::new();
        for row in rows {
            let record: PoolRecord = row.try_into()?;
            let Some(embedding) = record.embedding.as_deref() else {
                continue;
            };
            let similarity = Self::cosine_similarity(query, embedding);
            if similarity >= threshold {
                scored.push(ScoredRecord { record, similarity });
            }
        }

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.record.created_at.cmp(&a.record.created_at))
        });
        scored.truncate(top_k);

        Ok(scored)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: String,
    pool_id: String,
    chain: String,
    project: String,
    symbol: String,
    tvl_usd: f64,
    apy: f64,
    apy_base: f64,
    apy_reward: f64,
    apy_mean_30d: f64,
    apy_pct_1d: f64,
    apy_pct_7d: f64,
    apy_pct_30d: f64,
    reward_tokens: String,
    predictions: String,
    observed_at: String,
    created_at: String,
    embedding: Option<Vec<u8>>,
}

impl TryFrom<SnapshotRow> for PoolRecord {
    type Error = StoreError;

    fn try_from(row: SnapshotRow) -> Result<Self, Self::Error> {
        let embedding = row
            .embedding
            .as_deref()
            .map(SqliteRecordStore::bytes_to_embedding)
            .transpose()?;

        Ok(PoolRecord {
            id: super::parse_uuid(&row.id)?,
            pool_id: row.pool_id,
            chain: row.chain,
            project: row.project,
            symbol: row.symbol,
            tvl_usd: row.tvl_usd,
            apy: row.apy,
            apy_base: row.apy_base,
            apy_reward: row.apy_reward,
            apy_mean_30d: row.apy_mean_30d,
            apy_pct_1d: row.apy_pct_1d,
            apy_pct_7d: row.apy_pct_7d,
            apy_pct_30d: row.apy_pct_30d,
            reward_tokens: super::parse_json(&row.reward_tokens)?,
            predictions: super::parse_json(&row.predictions)?,
            observed_at: super::parse_datetime(&row.observed_at)?,
            created_at: super::parse_datetime(&row.created_at)?,
            embedding,
        })
    }
}
