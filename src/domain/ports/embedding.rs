//! Embedding provider port for semantic vector generation.

use async_trait::async_trait;

use crate::domain::errors::EmbedError;

/// Turns free text into a fixed-length numeric vector.
///
/// May fail independently of the rest of the pipeline; callers recover by
/// persisting the record without a vector rather than aborting the write.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g. "openai").
    fn name(&self) -> &'static str;

    /// Embedding dimension for this provider/model. Every returned vector
    /// has exactly this length; partial vectors are forbidden.
    fn dimension(&self) -> usize;

    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}
