//! Base trait for all chunkers, plus token estimation.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChunkOptions, LayoutBlock, TextChunk};

/// The core trait that all chunkers must implement.
///
/// A chunker turns a document's layout blocks into chunks suitable for
/// embedding and retrieval.
#[async_trait]
pub trait Chunker: Send + Sync {
    /// Get the name of this chunker.
    fn name(&self) -> &'static str;

    /// Chunk the given blocks with the provided options.
    ///
    /// # Arguments
    /// * `blocks` - Layout blocks in reading order
    /// * `options` - Token bounds and similarity threshold
    ///
    /// # Returns
    /// The final chunks, in document order.
    async fn chunk(&self, blocks: &[LayoutBlock], options: &ChunkOptions) -> Result<Vec<TextChunk>>;

    /// Get the description of this chunker.
    fn description(&self) -> &'static str {
        "A document chunker"
    }
}

/// Token counter trait for counting tokens in text.
pub trait TokenCounter: Send + Sync {
    /// Count the number of tokens in the given text.
    fn count_tokens(&self, text: &str) -> usize;
}

/// Estimates tokens from whitespace-delimited word count.
///
/// English prose averages roughly 0.75 words per model token. This is a
/// heuristic, not a tokenizer, but it is deterministic and never decreases
/// as words are added.
#[derive(Debug, Clone, Copy)]
pub struct WordRatioCounter {
    words_per_token: f64,
}

impl WordRatioCounter {
    /// Words-per-token ratio for English prose.
    pub const ENGLISH_WORDS_PER_TOKEN: f64 = 0.75;

    /// Create a counter with the English prose ratio.
    pub const fn new() -> Self {
        Self {
            words_per_token: Self::ENGLISH_WORDS_PER_TOKEN,
        }
    }

    /// Create a counter with a custom ratio.
    pub fn with_ratio(words_per_token: f64) -> Self {
        Self { words_per_token }
    }
}

impl Default for WordRatioCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for WordRatioCounter {
    fn count_tokens(&self, text: &str) -> usize {
        let words = text.split_whitespace().count();
        if words == 0 {
            return 0;
        }
        (words as f64 / self.words_per_token).round() as usize
    }
}

/// Estimate tokens using the default counter.
pub fn estimate_tokens(text: &str) -> usize {
    static COUNTER: WordRatioCounter = WordRatioCounter::new();
    COUNTER.count_tokens(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("   \n\t "), 0);
    }

    #[test]
    fn test_word_ratio() {
        assert_eq!(estimate_tokens("one two three four"), 5);
        assert_eq!(estimate_tokens("one"), 1);
        assert_eq!(estimate_tokens("one two"), 3);
        assert_eq!(estimate_tokens("one two three"), 4);
    }

    #[test]
    fn test_whitespace_runs_collapse() {
        assert_eq!(
            estimate_tokens("one   two\n\nthree\tfour"),
            estimate_tokens("one two three four")
        );
    }

    #[test]
    fn test_monotonic_in_word_count() {
        let mut text = String::new();
        let mut previous = 0;
        for i in 0..200 {
            text.push_str(&format!("word{} ", i));
            let tokens = estimate_tokens(&text);
            assert!(tokens >= previous);
            previous = tokens;
        }
        assert_eq!(previous, 267);
    }

    #[test]
    fn test_custom_ratio() {
        let counter = WordRatioCounter::with_ratio(1.0);
        assert_eq!(counter.count_tokens("a b c"), 3);
    }
}
