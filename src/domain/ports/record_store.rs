//! Record store port: durable keyed storage plus vector-ranked retrieval.

use async_trait::async_trait;

use crate::domain::errors::StoreError;
use crate::domain::models::{PoolRecord, ScoredRecord};

/// Durable storage for pool snapshots.
///
/// The store owns the schema and the uniqueness policy. Writes are
/// append-only: "upsert" always inserts a new snapshot, never updates a
/// prior one. Readers and writers may run concurrently; each row is
/// inserted atomically so readers never observe a half-written record.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new snapshot.
    ///
    /// The embedding arrives precomputed (or absent); this call never blocks
    /// on embedding work. A vector whose length does not match the store's
    /// pinned dimension fails with [`StoreError::SchemaMismatch`] rather
    /// than being truncated or padded.
    async fn upsert(&self, record: &PoolRecord) -> Result<(), StoreError>;

    /// Records ordered by `created_at` descending.
    ///
    /// An absent limit returns all rows, bounded only by store capacity;
    /// callers needing pagination must supply a limit.
    async fn list(&self, limit: Option<u32>) -> Result<Vec<PoolRecord>, StoreError>;

    /// Top-k records whose embedding is present and whose similarity to
    /// `query` is at least `threshold`, ordered by similarity descending
    /// (ties broken by `created_at` descending).
    ///
    /// Similarity is `1 - cosine_distance`, computed inside the store.
    /// Records without an embedding are excluded, never scored as zero.
    async fn search(
        &self,
        query: &[f32],
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, StoreError>;

    /// Release underlying connection resources. Idempotent.
    async fn close(&self);
}
