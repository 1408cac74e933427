//! Error types for the chunking engine.

/// Errors that can surface from the chunking engine.
///
/// Embedding failures never appear here; the merger absorbs them.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// Chunk options failed validation.
    #[error("invalid chunk options: {0}")]
    InvalidOptions(String),

    /// A pipeline stage failed unexpectedly.
    #[error("internal chunking error: {0}")]
    Internal(String),
}

/// Result type for chunking operations.
pub type Result<T> = std::result::Result<T, ChunkError>;
