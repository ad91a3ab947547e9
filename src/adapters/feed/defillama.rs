//! DeFi Llama yields feed client.
//!
//! Wraps the public `GET /pools` endpoint of `yields.llama.fi`, which
//! returns every tracked pool across all chains in a single response.
//! The base URL is injectable so tests can point the client at a local
//! mock server.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::errors::FeedError;
use crate::domain::models::{FeedConfig, RawPool};
use crate::domain::ports::PoolFeed;

/// Envelope of the `/pools` endpoint: `{"status": "...", "data": [...]}`.
#[derive(Debug, Deserialize)]
struct PoolsResponse {
    data: Vec<RawPool>,
}

/// HTTP client for the DeFi Llama yields API.
#[derive(Debug, Clone)]
pub struct DefiLlamaClient {
    http: Client,
    base_url: String,
}

impl DefiLlamaClient {
    pub fn new(config: &FeedConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl PoolFeed for DefiLlamaClient {
    async fn fetch_pools(&self) -> Result<Vec<RawPool>, FeedError> {
        let url = format!("{}/pools", self.base_url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Http(status.as_u16()));
        }

        let body: PoolsResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Malformed(e.to_string()))?;

        tracing::debug!(pool_count = body.data.len(), "fetched pools from feed");
        Ok(body.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> DefiLlamaClient {
        DefiLlamaClient::new(&FeedConfig {
            base_url: server.url(),
            timeout_secs: 5,
        })
    }

    #[tokio::test]
    async fn test_fetch_pools_parses_response() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pools")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "status": "success",
                    "data": [
                        {
                            "pool": "abc-123",
                            "chain": "Sonic",
                            "project": "beets",
                            "symbol": "S-USDC",
                            "tvlUsd": 1234567.8,
                            "apy": 12.5,
                            "apyBase": 10.0,
                            "apyReward": 2.5,
                            "apyPct1D": 0.1,
                            "rewardTokens": ["0xabc"]
                        },
                        {
                            "pool": "def-456",
                            "chain": "Ethereum",
                            "project": "aave-v3",
                            "symbol": "USDC",
                            "tvlUsd": 9.9e8
                        }
                    ]
                }"#,
            )
            .create_async()
            .await;

        let pools = client_for(&server).fetch_pools().await.unwrap();
        mock.assert_async().await;

        assert_eq!(pools.len(), 2);
        assert_eq!(pools[0].pool.as_deref(), Some("abc-123"));
        assert_eq!(pools[0].chain.as_deref(), Some("Sonic"));
        assert_eq!(pools[0].apy_pct_1d, Some(0.1));
        assert_eq!(pools[1].apy, None);
    }

    #[tokio::test]
    async fn test_fetch_pools_tolerates_sparse_entries() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pools")
            .with_status(200)
            .with_body(r#"{"status": "success", "data": [{}]}"#)
            .create_async()
            .await;

        let pools = client_for(&server).fetch_pools().await.unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0].chain, None);
    }

    #[tokio::test]
    async fn test_fetch_pools_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pools")
            .with_status(503)
            .create_async()
            .await;

        let err = client_for(&server).fetch_pools().await.unwrap_err();
        assert!(matches!(err, FeedError::Http(503)));
    }

    #[tokio::test]
    async fn test_fetch_pools_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pools")
            .with_status(200)
            .with_body("not json at all")
            .create_async()
            .await;

        let err = client_for(&server).fetch_pools().await.unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_pools_missing_data_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pools")
            .with_status(200)
            .with_body(r#"{"status": "success"}"#)
            .create_async()
            .await;

        let err = client_for(&server).fetch_pools().await.unwrap_err();
        assert!(matches!(err, FeedError::Malformed(_)));
    }
}
