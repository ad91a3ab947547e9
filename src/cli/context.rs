//! Shared command bootstrap: config, database, and adapters.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::adapters::embeddings::OpenAiEmbeddingProvider;
use crate::adapters::feed::DefiLlamaClient;
use crate::adapters::sqlite::{initialize_database, PoolConfig, SqliteRecordStore};
use crate::domain::models::Config;
use crate::domain::ports::{EmbeddingProvider, PoolFeed, RecordStore};

/// Everything a command needs, wired from configuration.
pub struct AppContext {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub feed: Arc<dyn PoolFeed>,
}

impl AppContext {
    /// Open the database and wire the adapters from configuration.
    ///
    /// Fails fast when the stored embedding dimension disagrees with the
    /// configured one; a mismatched store must never be written to.
    pub async fn from_config(config: Config) -> Result<Self> {
        let pool_config = PoolConfig {
            max_connections: config.database.max_connections,
            ..PoolConfig::default()
        };
        let pool = initialize_database(&config.database.url, pool_config)
            .await
            .with_context(|| format!("Failed to open database at {}", config.database.url))?;

        let store = SqliteRecordStore::new(pool, config.embedding.dimension);
        store
            .ensure_dimension()
            .await
            .context("Embedding dimension check failed")?;

        let embedder = OpenAiEmbeddingProvider::new(config.embedding.clone());
        let feed = DefiLlamaClient::new(&config.feed);

        Ok(Self {
            config,
            store: Arc::new(store),
            embedder: Arc::new(embedder),
            feed: Arc::new(feed),
        })
    }
}
