use serde::{Deserialize, Serialize};

/// Main configuration structure for poolwatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Upstream feed configuration
    #[serde(default)]
    pub feed: FeedConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Ingestion scheduler configuration
    #[serde(default)]
    pub ingestion: IngestionConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database configuration.
///
/// `url` has no usable default: an absent connection string is a fatal
/// startup error, not a soft degradation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// SQLite connection string (e.g. `sqlite:.poolwatch/poolwatch.db`)
    #[serde(default)]
    pub url: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

/// Upstream feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FeedConfig {
    /// Base URL of the yields feed
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_feed_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_feed_base_url() -> String {
    "https://yields.llama.fi".to_string()
}

const fn default_feed_timeout_secs() -> u64 {
    30
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_secs: default_feed_timeout_secs(),
        }
    }
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingConfig {
    /// Base URL of the OpenAI-compatible embeddings API
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,

    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Expected embedding dimension; pinned in the store schema
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,

    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout_secs")]
    pub timeout_secs: u64,

    /// API key. Falls back to the `OPENAI_API_KEY` env var when absent
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_embedding_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

const fn default_embedding_dimension() -> usize {
    1536
}

const fn default_embedding_timeout_secs() -> u64 {
    30
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_base_url(),
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
            timeout_secs: default_embedding_timeout_secs(),
            api_key: None,
        }
    }
}

/// Ingestion scheduler configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IngestionConfig {
    /// Seconds between ingestion cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Chain identifier that fetched pools are filtered to
    #[serde(default = "default_chain")]
    pub chain: String,

    /// Whether to run a cycle immediately at startup
    #[serde(default = "default_run_on_startup")]
    pub run_on_startup: bool,
}

const fn default_interval_secs() -> u64 {
    300
}

fn default_chain() -> String {
    "Sonic".to_string()
}

const fn default_run_on_startup() -> bool {
    true
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            chain: default_chain(),
            run_on_startup: default_run_on_startup(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.database.url.is_empty());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.feed.base_url, "https://yields.llama.fi");
        assert_eq!(config.embedding.dimension, 1536);
        assert_eq!(config.ingestion.interval_secs, 300);
        assert_eq!(config.ingestion.chain, "Sonic");
        assert!(config.ingestion.run_on_startup);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{"database": {"url": "sqlite::memory:"}, "ingestion": {"interval_secs": 60}}"#,
        )
        .unwrap();
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.ingestion.interval_secs, 60);
        assert_eq!(config.ingestion.chain, "Sonic");
    }
}
