//! Pool feed port: the upstream source of raw pool observations.

use async_trait::async_trait;

use crate::domain::errors::FeedError;
use crate::domain::models::RawPool;

/// Read-only client for the upstream pool feed.
///
/// Stateless, purely transport. Implementations perform no retries — retry
/// policy (skip the cycle, try again next interval) belongs to the
/// ingestion scheduler.
#[async_trait]
pub trait PoolFeed: Send + Sync {
    /// Fetch the full raw upstream dataset.
    async fn fetch_pools(&self) -> Result<Vec<RawPool>, FeedError>;
}
