//! HTTP client for an OpenAI-compatible embedding service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::circuit_breaker::{CircuitBreaker, CircuitConfig, CircuitError};
use super::provider::{EmbeddingError, EmbeddingProvider};
use crate::types::ChunkingConfig;

/// Embedding provider that calls `POST {base_url}/embeddings`.
///
/// Calls go through a circuit breaker; while it is open, requests fail
/// immediately with [`EmbeddingError::CircuitOpen`].
pub struct HttpEmbeddingProvider {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    breaker: CircuitBreaker,
}

/// Request payload for the embeddings endpoint.
#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Response from the embeddings endpoint.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl HttpEmbeddingProvider {
    /// Create a new provider for the given service.
    pub fn new(base_url: &str, model: &str, timeout: Duration) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            model: model.to_string(),
            api_key: None,
            breaker: CircuitBreaker::default(),
        })
    }

    /// Build a provider from service configuration, if a URL is configured.
    pub fn from_config(config: &ChunkingConfig) -> Result<Option<Self>, EmbeddingError> {
        let Some(url) = config.embedding_service_url.as_deref() else {
            return Ok(None);
        };
        let provider = Self::new(
            url,
            &config.embedding_model,
            Duration::from_secs(config.embedding_timeout_secs),
        )?;
        Ok(Some(match &config.embedding_api_key {
            Some(key) => provider.with_api_key(key),
            None => provider,
        }))
    }

    /// Authenticate requests with a bearer token.
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.trim().to_string());
        self
    }

    /// Replace the circuit breaker configuration.
    pub fn with_circuit_config(mut self, config: CircuitConfig) -> Self {
        self.breaker = CircuitBreaker::new(config);
        self
    }

    /// Endpoint requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Circuit breaker guarding this provider.
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let request = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)?;

        debug!(dimensions = embedding.len(), "Received embedding");
        Ok(embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match self.breaker.execute(self.request_embedding(text)).await {
            Ok(embedding) => Ok(embedding),
            Err(CircuitError::CircuitOpen) => Err(EmbeddingError::CircuitOpen),
            Err(CircuitError::Inner(e)) => Err(e),
        }
    }
}
