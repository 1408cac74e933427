//! Core types for the chunking service.

mod block;
mod chunk;
mod config;
mod request;

pub use block::{normalize_level, BlockType, HeadingLevel, LayoutBlock};
pub use chunk::{join_paragraphs, StructuralGroup, TextChunk, PARAGRAPH_SEPARATOR};
pub use config::{ChunkOptions, ChunkOptionsOverride, ChunkingConfig};
pub use request::{
    ChunkDocumentRequest, ChunkDocumentResponse, ChunkJobStatus, ChunkJobStatusResponse,
    ChunkingStrategy, StartChunkJobResponse,
};
