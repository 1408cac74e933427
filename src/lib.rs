//! Layout Chunker Library
//!
//! Turns the layout blocks of a parsed document (headings, paragraphs,
//! lists, tables, figures, captions) into retrieval-sized text chunks.
//! Blocks are grouped by heading structure, oversized groups are split at
//! sentence boundaries, and undersized or semantically similar neighbours
//! are merged using an embedding provider.

pub mod api;
pub mod chunkers;
pub mod embedding;
pub mod error;
pub mod jobs;
pub mod types;

pub use chunkers::{chunk_document, Chunker, LayoutChunker, WindowChunker};
pub use embedding::{EmbeddingProvider, HttpEmbeddingProvider, NoopEmbeddingProvider};
pub use error::{ChunkError, Result};
pub use types::{BlockType, ChunkOptions, LayoutBlock, TextChunk};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::chunkers::*;
    pub use crate::embedding::{EmbeddingError, EmbeddingProvider, SharedEmbeddingProvider};
    pub use crate::error::{ChunkError, Result};
    pub use crate::types::*;
}

/// Default token floor below which adjacent chunks merge
pub const DEFAULT_MIN_TOKENS: usize = 80;

/// Default token budget for a single chunk
pub const DEFAULT_MAX_TOKENS: usize = 400;

/// Default cosine similarity at which adjacent chunks merge
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.75;

/// Default number of embedding requests in flight per document
pub const DEFAULT_EMBEDDING_CONCURRENCY: usize = 8;

/// Default fallback window size in characters
pub const DEFAULT_FALLBACK_WINDOW_CHARS: usize = 2000;
