//! Fixed-window fallback chunker.
//!
//! Used when the layout pipeline fails. It ignores structure and cuts the
//! document text into windows of at most `window_chars` grapheme clusters,
//! tracking which blocks and pages each window touched.

use std::collections::BTreeSet;

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use super::base::Chunker;
use crate::error::Result;
use crate::types::{ChunkOptions, LayoutBlock, TextChunk, PARAGRAPH_SEPARATOR};
use crate::DEFAULT_FALLBACK_WINDOW_CHARS;

/// Chunker producing fixed-length character windows.
pub struct WindowChunker {
    window_chars: usize,
}

impl WindowChunker {
    /// Create a window chunker with the default window size.
    pub fn new() -> Self {
        Self {
            window_chars: DEFAULT_FALLBACK_WINDOW_CHARS,
        }
    }

    /// Create a window chunker with the given window size (at least 1).
    pub fn with_window(window_chars: usize) -> Self {
        Self {
            window_chars: window_chars.max(1),
        }
    }

    /// Cut the blocks into windows.
    pub fn windows(&self, blocks: &[LayoutBlock]) -> Vec<TextChunk> {
        let mut builder = WindowBuilder::new(self.window_chars);

        for block in blocks.iter().filter(|b| b.has_text()) {
            builder.separate();
            for grapheme in block.text.trim().graphemes(true) {
                builder.push(grapheme, block);
            }
        }

        builder.finish()
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

struct WindowBuilder {
    capacity: usize,
    text: String,
    length: usize,
    block_ids: Vec<String>,
    pages: BTreeSet<u32>,
    chunks: Vec<TextChunk>,
}

impl WindowBuilder {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            text: String::new(),
            length: 0,
            block_ids: Vec::new(),
            pages: BTreeSet::new(),
            chunks: Vec::new(),
        }
    }

    /// Start a new block within the current window.
    fn separate(&mut self) {
        if self.length > 0 {
            self.text.push_str(PARAGRAPH_SEPARATOR);
        }
    }

    fn push(&mut self, grapheme: &str, block: &LayoutBlock) {
        if self.length >= self.capacity {
            self.flush();
        }
        self.text.push_str(grapheme);
        self.length += 1;

        if let Some(id) = &block.id {
            if self.block_ids.last() != Some(id) {
                self.block_ids.push(id.clone());
            }
        }
        if let Some(page) = block.page {
            self.pages.insert(page);
        }
    }

    fn flush(&mut self) {
        if self.length == 0 {
            return;
        }
        let text = std::mem::take(&mut self.text);
        let chunk = TextChunk::new(
            format!("chunk_{}", self.chunks.len() + 1),
            text.trim_end(),
            Vec::new(),
            std::mem::take(&mut self.pages),
            std::mem::take(&mut self.block_ids),
        );
        self.chunks.push(chunk);
        self.length = 0;
    }

    fn finish(mut self) -> Vec<TextChunk> {
        self.flush();
        self.chunks
    }
}

#[async_trait]
impl Chunker for WindowChunker {
    fn name(&self) -> &'static str {
        "window"
    }

    fn description(&self) -> &'static str {
        "Splits document text into fixed-length character windows"
    }

    async fn chunk(&self, blocks: &[LayoutBlock], _options: &ChunkOptions) -> Result<Vec<TextChunk>> {
        Ok(self.windows(blocks))
    }
}
