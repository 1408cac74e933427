//! Semantic merging of adjacent chunks.
//!
//! Embeddings for all chunks are fetched up front (concurrently, results kept
//! in input order), then a strictly sequential left-to-right fold merges each
//! chunk into its predecessor when either is below the token floor or the
//! two are similar enough. Only adjacent chunks are ever compared.

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use super::similarity::{cosine_similarity, is_comparable};
use crate::embedding::EmbeddingProvider;
use crate::types::TextChunk;
use crate::DEFAULT_EMBEDDING_CONCURRENCY;

/// Why two adjacent chunks were (or were not) merged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MergeDecision {
    /// One of the chunks is below the token floor
    TokenFloor,
    /// The embeddings are at least as similar as the threshold
    Similar(f32),
    /// Keep the chunks apart
    Keep,
}

impl MergeDecision {
    /// Whether the decision merges the chunks.
    pub fn merges(&self) -> bool {
        !matches!(self, MergeDecision::Keep)
    }
}

/// A chunk carrying its embedding through the fold.
///
/// After a merge the embedding is the one of the first chunk in the run; it
/// is not recomputed for the combined text.
struct Candidate {
    chunk: TextChunk,
    embedding: Vec<f32>,
}

/// Merges adjacent chunks using an embedding provider.
pub struct SemanticMerger<'a> {
    provider: &'a dyn EmbeddingProvider,
    concurrency: usize,
}

impl<'a> SemanticMerger<'a> {
    /// Create a merger with the default embedding concurrency.
    pub fn new(provider: &'a dyn EmbeddingProvider) -> Self {
        Self {
            provider,
            concurrency: DEFAULT_EMBEDDING_CONCURRENCY,
        }
    }

    /// Set the maximum number of embedding requests in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Merge adjacent chunks, returning the result in document order.
    pub async fn merge(
        &self,
        chunks: Vec<TextChunk>,
        min_tokens: usize,
        similarity_threshold: f32,
    ) -> Vec<TextChunk> {
        if chunks.is_empty() {
            return Vec::new();
        }

        let embeddings = self.fetch_embeddings(&chunks).await;
        let input_count = chunks.len();

        let mut candidates = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| Candidate { chunk, embedding });

        let Some(mut current) = candidates.next() else {
            return Vec::new();
        };
        let mut merged = Vec::with_capacity(input_count);

        for next in candidates {
            let decision = decide(&current, &next, min_tokens, similarity_threshold);
            if decision.merges() {
                debug!(
                    into = %current.chunk.chunk_id,
                    from = %next.chunk.chunk_id,
                    ?decision,
                    "Merging adjacent chunks"
                );
                current.chunk = current.chunk.merge(&next.chunk);
            } else {
                merged.push(std::mem::replace(&mut current, next).chunk);
            }
        }
        merged.push(current.chunk);

        debug!(
            input = input_count,
            output = merged.len(),
            min_tokens,
            similarity_threshold,
            "Semantic merge complete"
        );
        merged
    }

    /// Fetch one embedding per chunk, index-aligned with the input.
    async fn fetch_embeddings(&self, chunks: &[TextChunk]) -> Vec<Vec<f32>> {
        let lookups: Vec<_> = chunks.iter().map(|chunk| self.embed_one(chunk)).collect();
        stream::iter(lookups)
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Embed one chunk. A failed lookup yields an empty vector.
    async fn embed_one(&self, chunk: &TextChunk) -> Vec<f32> {
        match self.provider.embed(&chunk.text).await {
            Ok(embedding) => embedding,
            Err(e) => {
                warn!(
                    chunk_id = %chunk.chunk_id,
                    provider = self.provider.name(),
                    error = %e,
                    "Embedding lookup failed, falling back to token floor"
                );
                Vec::new()
            }
        }
    }
}

fn decide(
    current: &Candidate,
    next: &Candidate,
    min_tokens: usize,
    similarity_threshold: f32,
) -> MergeDecision {
    if current.chunk.token_count < min_tokens || next.chunk.token_count < min_tokens {
        return MergeDecision::TokenFloor;
    }

    let comparable = current.embedding.len() == next.embedding.len()
        && is_comparable(&current.embedding)
        && is_comparable(&next.embedding);
    if comparable {
        let similarity = cosine_similarity(&current.embedding, &next.embedding);
        if similarity >= similarity_threshold {
            return MergeDecision::Similar(similarity);
        }
    }

    MergeDecision::Keep
}

/// Merge adjacent chunks that are undersized or similar.
pub async fn semantic_merge_chunks(
    chunks: Vec<TextChunk>,
    min_tokens: usize,
    similarity_threshold: f32,
    provider: &dyn EmbeddingProvider,
) -> Vec<TextChunk> {
    SemanticMerger::new(provider)
        .merge(chunks, min_tokens, similarity_threshold)
        .await
}
