//! Error taxonomy for the poolwatch pipeline.
//!
//! Each external collaborator gets its own error enum so the scheduler can
//! apply the right recovery policy: a failed fetch skips the cycle, a failed
//! embedding downgrades the record, a failed write skips the record.

use thiserror::Error;

/// Errors from the upstream pool feed.
///
/// The feed client performs no retries; retry policy belongs to the caller.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The feed responded with a non-2xx status.
    #[error("feed returned HTTP {0}")]
    Http(u16),

    /// The response body could not be decoded into the expected shape.
    #[error("feed payload malformed: {0}")]
    Malformed(String),

    /// The request never produced a response (connect failure, timeout).
    #[error("feed request failed: {0}")]
    Transport(String),
}

/// Errors from the embedding provider.
///
/// All variants are transient from the pipeline's point of view: the caller
/// stores the record without a vector rather than aborting the write.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The embedding API responded with a non-2xx status.
    #[error("embedding API returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The request never produced a response (connect failure, timeout).
    #[error("embedding request failed: {0}")]
    Transport(String),

    /// The response decoded but did not contain a usable vector.
    #[error("embedding response malformed: {0}")]
    Malformed(String),

    /// The provider is not usable at all (e.g. missing API key).
    #[error("embedding provider misconfigured: {0}")]
    Misconfigured(String),
}

/// Errors from the durable record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database connection failed or was lost mid-operation.
    #[error("store connection lost: {0}")]
    ConnectionLost(String),

    /// A schema constraint rejected the write.
    #[error("store constraint violation: {0}")]
    ConstraintViolation(String),

    /// A vector's length does not match the dimension the store was created
    /// with. This is a configuration defect, checked fatally at startup and
    /// never masked by truncating or padding.
    #[error("embedding dimension mismatch: store expects {expected}, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    /// A stored row could not be decoded back into a record.
    #[error("stored row corrupt: {0}")]
    Corrupt(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) => match db.kind() {
                sqlx::error::ErrorKind::UniqueViolation
                | sqlx::error::ErrorKind::ForeignKeyViolation
                | sqlx::error::ErrorKind::NotNullViolation
                | sqlx::error::ErrorKind::CheckViolation => {
                    StoreError::ConstraintViolation(db.message().to_string())
                }
                _ => StoreError::ConnectionLost(err.to_string()),
            },
            _ => StoreError::ConnectionLost(err.to_string()),
        }
    }
}

/// Errors surfaced by the read-only query surface.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Similarity threshold outside `[0, 1]`.
    #[error("similarity threshold {0} outside [0, 1]")]
    InvalidThreshold(f32),

    /// The query text could not be embedded.
    #[error("failed to embed query: {0}")]
    Embed(#[from] EmbedError),

    /// The store failed; never disguised as an empty result set.
    #[error(transparent)]
    Store(#[from] StoreError),
}
