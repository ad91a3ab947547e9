//! Ports: trait seams between the pipeline and its external collaborators.

pub mod embedding;
pub mod feed;
pub mod record_store;

pub use embedding::EmbeddingProvider;
pub use feed::PoolFeed;
pub use record_store::RecordStore;
