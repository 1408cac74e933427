//! End-to-end layout chunking pipeline.

use async_trait::async_trait;
use tracing::{debug, info};

use super::base::Chunker;
use super::flattener::structural_chunks_to_text_chunks;
use super::grouper::group_structurally;
use super::merger::SemanticMerger;
use super::splitter::split_large_chunks;
use crate::embedding::{EmbeddingProvider, SharedEmbeddingProvider};
use crate::error::Result;
use crate::types::{ChunkOptions, LayoutBlock, TextChunk};
use crate::DEFAULT_EMBEDDING_CONCURRENCY;

/// Run the full pipeline: group, flatten, split, then merge.
///
/// The result has no chunk above `max_tokens` except unsplittable run-on
/// sentences and chunks the merger combined. Empty input yields an empty
/// result.
pub async fn chunk_document(
    blocks: &[LayoutBlock],
    options: &ChunkOptions,
    provider: &dyn EmbeddingProvider,
) -> Result<Vec<TextChunk>> {
    run_pipeline(blocks, options, provider, DEFAULT_EMBEDDING_CONCURRENCY).await
}

async fn run_pipeline(
    blocks: &[LayoutBlock],
    options: &ChunkOptions,
    provider: &dyn EmbeddingProvider,
    concurrency: usize,
) -> Result<Vec<TextChunk>> {
    options.validate()?;
    if blocks.is_empty() {
        return Ok(Vec::new());
    }

    let groups = group_structurally(blocks);
    let flat = structural_chunks_to_text_chunks(&groups);
    let split = split_large_chunks(&flat, options.max_tokens);
    debug!(
        groups = groups.len(),
        flattened = flat.len(),
        split = split.len(),
        "Structural stages complete"
    );

    let merged = SemanticMerger::new(provider)
        .with_concurrency(concurrency)
        .merge(split, options.min_tokens, options.similarity_threshold)
        .await;

    info!(
        blocks = blocks.len(),
        chunks = merged.len(),
        provider = provider.name(),
        "Chunked document"
    );
    Ok(merged)
}

/// Layout-aware chunker bound to an embedding provider.
pub struct LayoutChunker {
    provider: SharedEmbeddingProvider,
    concurrency: usize,
}

impl LayoutChunker {
    /// Create a new layout chunker.
    pub fn new(provider: SharedEmbeddingProvider) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
        }
    }

    /// Builder: set the number of embedding requests in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Embedding provider in use.
    pub fn provider(&self) -> &SharedEmbeddingProvider {
        &self.provider
    }
}

#[async_trait]
impl Chunker for LayoutChunker {
    fn name(&self) -> &'static str {
        "layout"
    }

    fn description(&self) -> &'static str {
        "Groups blocks by document structure, splits at sentences and merges small or similar neighbours"
    }

    async fn chunk(&self, blocks: &[LayoutBlock], options: &ChunkOptions) -> Result<Vec<TextChunk>> {
        run_pipeline(blocks, options, self.provider.as_ref(), self.concurrency).await
    }
}
