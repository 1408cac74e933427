//! Chunk type definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::LayoutBlock;
use crate::chunkers::estimate_tokens;

/// Separator placed between block texts and between merged chunks.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// An intermediate aggregate of layout blocks sharing a heading context.
///
/// Only the structural grouper creates these; they are flattened into
/// [`TextChunk`]s straight away.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructuralGroup {
    /// Blocks in document order
    pub blocks: Vec<LayoutBlock>,
    /// Heading lineage active when the group was opened (at most 3 entries)
    pub heading_path: Vec<String>,
    /// Pages touched by the blocks
    pub pages: BTreeSet<u32>,
}

impl StructuralGroup {
    /// Open an empty group under the given heading path.
    pub fn new(heading_path: Vec<String>) -> Self {
        Self {
            heading_path,
            ..Default::default()
        }
    }

    /// Append a block, recording its page.
    pub fn push(&mut self, block: LayoutBlock) {
        if let Some(page) = block.page {
            self.pages.insert(page);
        }
        self.blocks.push(block);
    }

    /// Number of blocks in the group.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if the group has no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// A bounded span of document text prepared for embedding and retrieval.
///
/// `token_count` is always derived from `text` by the constructors; every
/// pipeline stage builds new chunks instead of editing existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextChunk {
    /// Positional identifier (`chunk_<n>`, or `chunk_<n>_<m>` after a split)
    pub chunk_id: String,

    /// Full text of the chunk
    pub text: String,

    /// Estimated token count of `text`
    pub token_count: usize,

    /// Heading lineage, 0-3 entries
    pub heading_path: Vec<String>,

    /// Pages touched, ascending and deduplicated
    pub page_range: Vec<u32>,

    /// Originating layout block identifiers, in document order
    pub block_ids: Vec<String>,
}

impl TextChunk {
    /// Create a chunk, estimating its token count.
    pub fn new(
        chunk_id: impl Into<String>,
        text: impl Into<String>,
        heading_path: Vec<String>,
        page_range: impl IntoIterator<Item = u32>,
        block_ids: Vec<String>,
    ) -> Self {
        let text = text.into();
        let page_range: BTreeSet<u32> = page_range.into_iter().collect();
        Self {
            chunk_id: chunk_id.into(),
            token_count: estimate_tokens(&text),
            text,
            heading_path,
            page_range: page_range.into_iter().collect(),
            block_ids,
        }
    }

    /// Derive a chunk with new id and text, keeping lineage, pages and blocks.
    pub fn derive(&self, chunk_id: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            chunk_id: chunk_id.into(),
            token_count: estimate_tokens(&text),
            text,
            heading_path: self.heading_path.clone(),
            page_range: self.page_range.clone(),
            block_ids: self.block_ids.clone(),
        }
    }

    /// Combine this chunk with the one that follows it.
    ///
    /// Keeps this chunk's id, and its heading path unless that is empty.
    pub fn merge(&self, next: &TextChunk) -> Self {
        let text = join_paragraphs([self.text.as_str(), next.text.as_str()]);
        let heading_path = if self.heading_path.is_empty() {
            next.heading_path.clone()
        } else {
            self.heading_path.clone()
        };
        let block_ids = self
            .block_ids
            .iter()
            .chain(next.block_ids.iter())
            .cloned()
            .collect();

        Self::new(
            self.chunk_id.clone(),
            text,
            heading_path,
            self.page_range.iter().chain(next.page_range.iter()).copied(),
            block_ids,
        )
    }

    /// Get the length of the chunk text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the chunk text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Join non-empty pieces with a blank line.
pub fn join_paragraphs<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    pieces
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(id: &str, text: &str, path: &[&str], pages: &[u32], blocks: &[&str]) -> TextChunk {
        TextChunk::new(
            id,
            text,
            path.iter().map(|s| s.to_string()).collect(),
            pages.iter().copied(),
            blocks.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn test_new_sorts_and_dedups_pages() {
        let c = chunk("chunk_1", "one two three four", &[], &[3, 1, 3, 2], &[]);
        assert_eq!(c.page_range, vec![1, 2, 3]);
        assert_eq!(c.token_count, 5);
    }

    #[test]
    fn test_merge_combines_fields() {
        let a = chunk("chunk_1", "Alpha.", &["Intro"], &[2], &["b1"]);
        let b = chunk("chunk_2", "Beta.", &["Other"], &[1, 2], &["b2", "b3"]);

        let merged = a.merge(&b);
        assert_eq!(merged.chunk_id, "chunk_1");
        assert_eq!(merged.text, "Alpha.\n\nBeta.");
        assert_eq!(merged.token_count, estimate_tokens("Alpha. Beta."));
        assert_eq!(merged.heading_path, vec!["Intro".to_string()]);
        assert_eq!(merged.page_range, vec![1, 2]);
        assert_eq!(merged.block_ids, vec!["b1", "b2", "b3"]);
    }

    #[test]
    fn test_merge_takes_next_heading_path_when_empty() {
        let a = chunk("chunk_1", "", &[], &[], &["fig"]);
        let b = chunk("chunk_2", "Body text.", &["Methods"], &[4], &["p1"]);

        let merged = a.merge(&b);
        assert_eq!(merged.text, "Body text.");
        assert_eq!(merged.heading_path, vec!["Methods".to_string()]);
    }

    #[test]
    fn test_derive_recomputes_tokens() {
        let source = chunk("chunk_1", "a b c d e f g h", &["H"], &[1], &["b1"]);
        let derived = source.derive("chunk_1_1", "a b c");
        assert_eq!(derived.token_count, 4);
        assert_eq!(derived.heading_path, source.heading_path);
        assert_eq!(derived.block_ids, source.block_ids);
    }

    #[test]
    fn test_group_tracks_pages() {
        let mut group = StructuralGroup::new(vec!["H".into()]);
        group.push(LayoutBlock::paragraph("p1", "x").on_page(4));
        group.push(LayoutBlock::paragraph("p2", "y").on_page(2));
        group.push(LayoutBlock::paragraph("p3", "z"));
        assert_eq!(group.len(), 3);
        assert_eq!(group.pages.iter().copied().collect::<Vec<_>>(), vec![2, 4]);
    }
}
