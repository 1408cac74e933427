//! Embedding providers used by the semantic merger.

mod circuit_breaker;
mod http;
mod provider;

pub use circuit_breaker::{CircuitBreaker, CircuitConfig, CircuitError, CircuitState};
pub use http::HttpEmbeddingProvider;
pub use provider::{EmbeddingError, EmbeddingProvider, NoopEmbeddingProvider, SharedEmbeddingProvider};
