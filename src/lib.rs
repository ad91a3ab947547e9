//! Poolwatch - DeFi pool snapshot harvester with semantic search
//!
//! Poolwatch periodically pulls liquidity-pool metrics from the DeFi Llama
//! yields feed, persists per-cycle snapshots with text embeddings, and
//! answers free-text similarity queries over the stored history.
//!
//! # Architecture
//!
//! This crate follows Clean Architecture / Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, ports, and the error taxonomy
//! - **Adapters Layer** (`adapters`): SQLite store, feed client, embedding provider
//! - **Service Layer** (`services`): Ingestion scheduler and similarity search
//! - **Infrastructure Layer** (`infrastructure`): Configuration and logging
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use poolwatch::services::{IngestionScheduler, SchedulerConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Wire adapters, then run the scheduler
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{Config, PoolRecord, RawPool, ScoredRecord};
pub use domain::ports::{EmbeddingProvider, PoolFeed, RecordStore};
pub use services::{CycleReport, IngestionScheduler, QueryService, SchedulerConfig};
