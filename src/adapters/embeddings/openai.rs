//! OpenAI embedding provider adapter.
//!
//! Calls the `/embeddings` endpoint of any OpenAI-compatible API
//! (OpenAI itself, Azure OpenAI, local servers). The base URL is
//! injectable so tests can run against a mock server.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::EmbedError;
use crate::domain::models::EmbeddingConfig;
use crate::domain::ports::EmbeddingProvider;

pub struct OpenAiEmbeddingProvider {
    config: EmbeddingConfig,
    client: reqwest::Client,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to build HTTP client");
        Self { config, client }
    }

    /// API key from config, falling back to `OPENAI_API_KEY`.
    fn api_key(&self) -> Result<String, EmbedError> {
        self.config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                EmbedError::Misconfigured(
                    "OpenAI API key not set. Set OPENAI_API_KEY or configure embedding.api_key."
                        .to_string(),
                )
            })
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let api_key = self.api_key()?;
        let url = format!(
            "{}/embeddings",
            self.config.base_url.trim_end_matches('/')
        );

        let request_body = EmbeddingsRequest {
            model: self.config.model.clone(),
            input: vec![text.to_string()],
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| EmbedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(EmbedError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let result: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Malformed(e.to_string()))?;

        let vector = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| EmbedError::Malformed("empty embedding response".to_string()))?;

        if vector.len() != self.config.dimension {
            return Err(EmbedError::Malformed(format!(
                "expected {}-dimensional embedding, got {}",
                self.config.dimension,
                vector.len()
            )));
        }

        Ok(vector)
    }
}

// -- OpenAI API request/response types --

#[derive(Debug, Serialize)]
struct EmbeddingsRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_for(server: &mockito::ServerGuard, dimension: usize) -> OpenAiEmbeddingProvider {
        OpenAiEmbeddingProvider::new(EmbeddingConfig {
            base_url: server.url(),
            model: "text-embedding-3-small".to_string(),
            dimension,
            timeout_secs: 5,
            api_key: Some("test-key".to_string()),
        })
    }

    #[tokio::test]
    async fn test_embed_returns_vector() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/embeddings")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_body(r#"{"data": [{"embedding": [0.1, 0.2, 0.3], "index": 0}]}"#)
            .create_async()
            .await;

        let vector = provider_for(&server, 3).embed("Sonic beets S-USDC").await.unwrap();
        mock.assert_async().await;
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn test_embed_rejects_wrong_dimension() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": [{"embedding": [0.1, 0.2], "index": 0}]}"#)
            .create_async()
            .await;

        let err = provider_for(&server, 3).embed("text").await.unwrap_err();
        assert!(matches!(err, EmbedError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_embed_surfaces_http_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(429)
            .with_body("rate limited")
            .create_async()
            .await;

        let err = provider_for(&server, 3).embed("text").await.unwrap_err();
        match err {
            EmbedError::Http { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_embed_empty_data_is_malformed() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/embeddings")
            .with_status(200)
            .with_body(r#"{"data": []}"#)
            .create_async()
            .await;

        let err = provider_for(&server, 3).embed("text").await.unwrap_err();
        assert!(matches!(err, EmbedError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_missing_api_key_is_misconfigured() {
        let provider = OpenAiEmbeddingProvider::new(EmbeddingConfig {
            api_key: None,
            ..EmbeddingConfig::default()
        });
        if std::env::var("OPENAI_API_KEY").is_err() {
            let err = provider.embed("text").await.unwrap_err();
            assert!(matches!(err, EmbedError::Misconfigured(_)));
        }
    }
}
