//! Similarity search over stored snapshots.

use std::sync::Arc;

use crate::domain::errors::QueryError;
use crate::domain::models::{PoolRecord, ScoredRecord};
use crate::domain::ports::{EmbeddingProvider, RecordStore};

pub const DEFAULT_THRESHOLD: f32 = 0.5;
pub const DEFAULT_TOP_K: usize = 10;

/// Embeds free-text queries and ranks stored snapshots by cosine
/// similarity.
pub struct QueryService {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn RecordStore>,
}

impl QueryService {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self { embedder, store }
    }

    /// Embed `query` and return the `top_k` snapshots scoring at or above
    /// `threshold`, best first.
    pub async fn search(
        &self,
        query: &str,
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, QueryError> {
        Self::validate_threshold(threshold)?;

        let vector = self
            .embedder
            .embed(query)
            .await
            .map_err(QueryError::Embed)?;

        tracing::debug!(
            query_len = query.len(),
            threshold,
            top_k,
            "running similarity search"
        );

        Ok(self.store.search(&vector, threshold, top_k).await?)
    }

    /// Search with a pre-computed query vector.
    pub async fn search_with_vector(
        &self,
        vector: &[f32],
        threshold: f32,
        top_k: usize,
    ) -> Result<Vec<ScoredRecord>, QueryError> {
        Self::validate_threshold(threshold)?;
        Ok(self.store.search(vector, threshold, top_k).await?)
    }

    /// List the most recent snapshots, newest first.
    pub async fn list(&self, limit: Option<u32>) -> Result<Vec<PoolRecord>, QueryError> {
        Ok(self.store.list(limit).await?)
    }

    fn validate_threshold(threshold: f32) -> Result<(), QueryError> {
        if !(0.0..=1.0).contains(&threshold) || threshold.is_nan() {
            return Err(QueryError::InvalidThreshold(threshold));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_threshold_bounds() {
        assert!(QueryService::validate_threshold(0.0).is_ok());
        assert!(QueryService::validate_threshold(1.0).is_ok());
        assert!(QueryService::validate_threshold(0.5).is_ok());

        assert!(matches!(
            QueryService::validate_threshold(-0.1),
            Err(QueryError::InvalidThreshold(_))
        ));
        assert!(matches!(
            QueryService::validate_threshold(1.1),
            Err(QueryError::InvalidThreshold(_))
        ));
        assert!(matches!(
            QueryService::validate_threshold(f32::NAN),
            Err(QueryError::InvalidThreshold(_))
        ));
    }
}
