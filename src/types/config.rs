//! Configuration types for chunking.

use serde::{Deserialize, Serialize};

use crate::error::{ChunkError, Result};
use crate::{
    DEFAULT_EMBEDDING_CONCURRENCY, DEFAULT_FALLBACK_WINDOW_CHARS, DEFAULT_MAX_TOKENS,
    DEFAULT_MIN_TOKENS, DEFAULT_SIMILARITY_THRESHOLD,
};

/// Global chunking service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Port the HTTP server listens on
    pub port: u16,

    /// Default token floor below which adjacent chunks merge
    pub min_tokens: usize,

    /// Default token budget for a single chunk
    pub max_tokens: usize,

    /// Default cosine similarity at which adjacent chunks merge
    pub similarity_threshold: f32,

    /// Base URL of an OpenAI-compatible embedding service
    pub embedding_service_url: Option<String>,

    /// Embedding model name
    pub embedding_model: String,

    /// Bearer token for the embedding service
    #[serde(skip_serializing)]
    pub embedding_api_key: Option<String>,

    /// Per-request embedding timeout in seconds
    pub embedding_timeout_secs: u64,

    /// Maximum embedding requests in flight per document
    pub embedding_concurrency: usize,

    /// Window size for the fallback chunker, in characters
    pub fallback_window_chars: usize,

    /// How long finished jobs are kept, in seconds
    pub job_ttl_secs: u64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            port: 3017,
            min_tokens: DEFAULT_MIN_TOKENS,
            max_tokens: DEFAULT_MAX_TOKENS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            embedding_service_url: None,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_api_key: None,
            embedding_timeout_secs: 30,
            embedding_concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
            fallback_window_chars: DEFAULT_FALLBACK_WINDOW_CHARS,
            job_ttl_secs: 3600,
        }
    }
}

impl ChunkingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            min_tokens: env_or("CHUNK_MIN_TOKENS", defaults.min_tokens),
            max_tokens: env_or("CHUNK_MAX_TOKENS", defaults.max_tokens),
            similarity_threshold: env_or(
                "CHUNK_SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            ),
            embedding_service_url: std::env::var("EMBEDDING_SERVICE_URL")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            embedding_model: std::env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_api_key: std::env::var("EMBEDDING_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            embedding_timeout_secs: env_or("EMBEDDING_TIMEOUT_SECS", defaults.embedding_timeout_secs),
            embedding_concurrency: env_or("EMBEDDING_CONCURRENCY", defaults.embedding_concurrency),
            fallback_window_chars: env_or("FALLBACK_WINDOW_CHARS", defaults.fallback_window_chars),
            job_ttl_secs: env_or("JOB_TTL_SECS", defaults.job_ttl_secs),
        }
    }

    /// Lifetime of finished jobs, or `None` if `job_ttl_secs` is out of range.
    pub fn job_ttl(&self) -> Option<chrono::Duration> {
        i64::try_from(self.job_ttl_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
    }

    /// Chunk options used when a request does not override them.
    pub fn default_options(&self) -> ChunkOptions {
        ChunkOptions {
            min_tokens: self.min_tokens,
            max_tokens: self.max_tokens,
            similarity_threshold: self.similarity_threshold,
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Options for a single document chunking run.
///
/// Unknown keys are rejected when decoding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkOptions {
    /// Chunks below this many tokens merge with their neighbour
    #[serde(default = "default_min_tokens")]
    pub min_tokens: usize,

    /// Chunks above this many tokens are split at sentence boundaries
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Adjacent chunks at or above this cosine similarity merge
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,
}

fn default_min_tokens() -> usize {
    DEFAULT_MIN_TOKENS
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_similarity_threshold() -> f32 {
    DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            min_tokens: DEFAULT_MIN_TOKENS,
            max_tokens: DEFAULT_MAX_TOKENS,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }
}

impl ChunkOptions {
    /// Create options with the given token bounds and the default threshold.
    pub fn with_bounds(min_tokens: usize, max_tokens: usize) -> Self {
        Self {
            min_tokens,
            max_tokens,
            ..Default::default()
        }
    }

    /// Set the similarity threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    /// Check that the options can drive a chunking run.
    pub fn validate(&self) -> Result<()> {
        if self.max_tokens == 0 {
            return Err(ChunkError::InvalidOptions(
                "maxTokens must be greater than 0".to_string(),
            ));
        }
        if !self.similarity_threshold.is_finite() {
            return Err(ChunkError::InvalidOptions(format!(
                "similarityThreshold must be finite, got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

/// Partial options as sent by API clients; omitted fields take service defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChunkOptionsOverride {
    #[serde(default)]
    pub min_tokens: Option<usize>,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
}

impl ChunkOptionsOverride {
    /// Fill in missing fields from the given defaults.
    pub fn resolve(&self, defaults: ChunkOptions) -> ChunkOptions {
        ChunkOptions {
            min_tokens: self.min_tokens.unwrap_or(defaults.min_tokens),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            similarity_threshold: self
                .similarity_threshold
                .unwrap_or(defaults.similarity_threshold),
        }
    }
}
