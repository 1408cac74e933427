//! Embedding provider abstraction.

use std::sync::Arc;

use async_trait::async_trait;

/// Errors returned by embedding providers.
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("embedding service unavailable (circuit open)")]
    CircuitOpen,

    #[error("embedding service returned no vectors")]
    EmptyResponse,
}

/// Maps text to a vector used for similarity comparison.
///
/// An empty vector means "no embedding available"; callers must treat it as
/// not taking part in similarity decisions. Dimensionality only needs to be
/// consistent within one document.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Shared handle to an embedding provider.
pub type SharedEmbeddingProvider = Arc<dyn EmbeddingProvider>;

/// Provider that never produces embeddings.
///
/// With this provider the merger falls back to the token floor rule alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for NoopEmbeddingProvider {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(Vec::new())
    }
}
