//! Flattening of structural groups into text chunks.

use crate::types::{join_paragraphs, StructuralGroup, TextChunk};

/// Convert each group into a chunk with id `chunk_<n>` (1-based).
///
/// Block texts are joined with a blank line; empty texts and blocks without
/// an id contribute nothing to `text` and `block_ids` respectively.
pub fn structural_chunks_to_text_chunks(groups: &[StructuralGroup]) -> Vec<TextChunk> {
    groups
        .iter()
        .enumerate()
        .map(|(i, group)| flatten_group(i + 1, group))
        .collect()
}

fn flatten_group(position: usize, group: &StructuralGroup) -> TextChunk {
    let text = join_paragraphs(group.blocks.iter().map(|b| b.text.as_str()));
    let block_ids = group
        .blocks
        .iter()
        .filter_map(|b| b.id.clone())
        .collect();

    TextChunk::new(
        format!("chunk_{}", position),
        text,
        group.heading_path.clone(),
        group.pages.iter().copied(),
        block_ids,
    )
}
