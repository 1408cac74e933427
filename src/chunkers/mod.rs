//! The chunking engine: structural grouping, flattening, splitting and
//! semantic merging, plus a fixed-window fallback.

mod base;
mod flattener;
mod grouper;
mod merger;
mod pipeline;
mod similarity;
mod splitter;
mod window;

pub use base::{estimate_tokens, Chunker, TokenCounter, WordRatioCounter};
pub use flattener::structural_chunks_to_text_chunks;
pub use grouper::{group_structurally, MAX_HEADING_DEPTH};
pub use merger::{semantic_merge_chunks, MergeDecision, SemanticMerger};
pub use pipeline::{chunk_document, LayoutChunker};
pub use similarity::cosine_similarity;
pub use splitter::{split_large_chunks, split_long_chunk, split_sentences};
pub use window::WindowChunker;
