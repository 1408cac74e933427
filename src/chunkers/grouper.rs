//! Structural grouping of layout blocks.
//!
//! Headings and atomic blocks (lists, tables, figures, captions) are chunk
//! boundaries. Paragraphs accumulate until the next boundary.

use tracing::debug;

use crate::types::{normalize_level, BlockType, HeadingLevel, LayoutBlock, StructuralGroup};

/// Maximum depth of a heading path.
pub const MAX_HEADING_DEPTH: usize = 3;

/// Partition blocks into structural groups in a single left-to-right pass.
///
/// A heading closes the current group and opens a new one that starts with
/// the heading itself. An atomic block closes the current group and is
/// emitted alone. Groups are never emitted empty.
pub fn group_structurally(blocks: &[LayoutBlock]) -> Vec<StructuralGroup> {
    let mut grouper = Grouper::default();
    for block in blocks {
        grouper.accept(block);
    }
    let groups = grouper.finish();

    debug!(
        blocks = blocks.len(),
        groups = groups.len(),
        "Grouped layout blocks"
    );
    groups
}

#[derive(Default)]
struct Grouper {
    heading_path: Vec<String>,
    current: StructuralGroup,
    groups: Vec<StructuralGroup>,
}

impl Grouper {
    fn accept(&mut self, block: &LayoutBlock) {
        if block.block_type == BlockType::Heading {
            self.close();
            self.heading_path = next_heading_path(
                &self.heading_path,
                normalize_level(block.level),
                &block.text,
            );
            self.current = StructuralGroup::new(self.heading_path.clone());
            self.current.push(block.clone());
        } else if block.block_type.is_atomic() {
            self.close();
            let mut standalone = StructuralGroup::new(self.heading_path.clone());
            standalone.push(block.clone());
            self.groups.push(standalone);
        } else {
            self.current.push(block.clone());
        }
    }

    /// Emit the current group if it has blocks and open a fresh one.
    fn close(&mut self) {
        let fresh = StructuralGroup::new(self.heading_path.clone());
        let closed = std::mem::replace(&mut self.current, fresh);
        if !closed.is_empty() {
            self.groups.push(closed);
        }
    }

    fn finish(mut self) -> Vec<StructuralGroup> {
        self.close();
        self.groups
    }
}

/// Compute the heading path after a heading at `level`.
///
/// Ancestors that were never set are skipped rather than left as gaps.
fn next_heading_path(path: &[String], level: HeadingLevel, title: &str) -> Vec<String> {
    let keep = match level {
        HeadingLevel::H1 => 0,
        HeadingLevel::H2 => 1,
        HeadingLevel::H3 => 2,
    };
    let mut next: Vec<String> = path.iter().take(keep).cloned().collect();
    next.push(title.to_string());
    debug_assert!(next.len() <= MAX_HEADING_DEPTH);
    next
}
