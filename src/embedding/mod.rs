//! Embedding client abstraction and the Ollama-backed adapter.
//!
//! The pipeline talks to an Ollama-style endpoint: `POST {base}/api/embeddings`
//! with `{"model": ..., "prompt": ...}` returning `{"embedding": [f32]}`. Every
//! request carries a bounded timeout; embedding services may cold-start, so the
//! default is generous (60s) but always finite.

use crate::config::Config;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const INITIAL_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(5);

/// Errors raised while requesting embeddings.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// The request exceeded the configured timeout.
    #[error("embedding request timed out")]
    Timeout,
    /// HTTP layer failed before receiving a response.
    #[error("embedding request failed: {0}")]
    Http(#[source] reqwest::Error),
    /// The service responded with a non-success status.
    #[error("unexpected embedding service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the embedding service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The response body did not carry a usable vector.
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
}

impl EmbeddingError {
    /// Whether the failure is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout => true,
            Self::Http(source) => source.is_connect() || source.is_timeout(),
            Self::UnexpectedStatus { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::MalformedResponse(_) => false,
        }
    }
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for a single chunk of text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

/// Embedding client backed by an Ollama-style HTTP endpoint.
pub struct OllamaEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
    max_retries: u32,
}

impl OllamaEmbeddingClient {
    /// Construct a client from the loaded configuration.
    pub fn new(config: &Config) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .user_agent("rfp-ingest/0.2")
            .timeout(Duration::from_secs(config.embedding_timeout_secs))
            .build()
            .map_err(EmbeddingError::Http)?;

        Ok(Self {
            client,
            base_url: config.embedding_url.trim_end_matches('/').to_string(),
            model: config.embedding_model.clone(),
            max_retries: config.embedding_max_retries,
        })
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&EmbedRequest {
                model: &self.model,
                prompt: text,
            })
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    EmbeddingError::Timeout
                } else {
                    EmbeddingError::Http(err)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::UnexpectedStatus { status, body });
        }

        let payload: EmbedResponse = response
            .json()
            .await
            .map_err(|err| EmbeddingError::MalformedResponse(err.to_string()))?;

        if payload.embedding.is_empty() {
            return Err(EmbeddingError::MalformedResponse(
                "response carried an empty embedding".to_string(),
            ));
        }

        Ok(payload.embedding)
    }
}

#[async_trait]
impl EmbeddingClient for OllamaEmbeddingClient {
    /// Request an embedding, retrying transient failures up to the configured
    /// attempt budget with exponential backoff. Retries stay scoped to this
    /// single call; the orchestrator's all-or-nothing policy is unaffected.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut backoff = INITIAL_BACKOFF;
        let mut attempt = 0u32;

        loop {
            match self.request_embedding(text).await {
                Ok(vector) => return Ok(vector),
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        model = %self.model,
                        attempt,
                        max_retries = self.max_retries,
                        error = %error,
                        "Embedding request failed; retrying"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_BACKOFF);
                }
                Err(error) => return Err(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn client_for(server: &MockServer, max_retries: u32) -> OllamaEmbeddingClient {
        OllamaEmbeddingClient {
            client: Client::builder()
                .user_agent("rfp-ingest-test")
                .timeout(Duration::from_secs(5))
                .build()
                .expect("client"),
            base_url: server.base_url(),
            model: "nomic-embed-text".into(),
            max_retries,
        }
    }

    #[tokio::test]
    async fn embed_sends_model_and_prompt() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/embeddings")
                    .json_body(json!({"model": "nomic-embed-text", "prompt": "hello"}));
                then.status(200)
                    .json_body(json!({"embedding": [0.1, 0.2, 0.3]}));
            })
            .await;

        let vector = client_for(&server, 0).embed("hello").await.expect("vector");

        mock.assert();
        assert_eq!(vector, vec![0.1, 0.2, 0.3]);
    }

    #[tokio::test]
    async fn server_errors_are_retried_up_to_the_budget() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embeddings");
                then.status(503).body("overloaded");
            })
            .await;

        let error = client_for(&server, 2).embed("hello").await.unwrap_err();

        mock.assert_hits(3);
        assert!(matches!(
            error,
            EmbeddingError::UnexpectedStatus { status, .. } if status == StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embeddings");
                then.status(400).body("bad request");
            })
            .await;

        let error = client_for(&server, 3).embed("hello").await.unwrap_err();

        mock.assert_hits(1);
        assert!(!error.is_retryable());
    }

    #[tokio::test]
    async fn empty_embedding_is_rejected() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/embeddings");
                then.status(200).json_body(json!({"embedding": []}));
            })
            .await;

        let error = client_for(&server, 0).embed("hello").await.unwrap_err();
        assert!(matches!(error, EmbeddingError::MalformedResponse(_)));
    }
}
