pub mod config;
pub mod pool;

pub use config::{
    Config, DatabaseConfig, EmbeddingConfig, FeedConfig, IngestionConfig, LoggingConfig,
};
pub use pool::{PoolRecord, RawPool, ScoredRecord, UNKNOWN};
