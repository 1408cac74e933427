//! Sentence-boundary splitting of oversized chunks.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use super::base::estimate_tokens;
use crate::types::TextChunk;

lazy_static! {
    /// Terminal punctuation followed by whitespace.
    static ref SENTENCE_BOUNDARY: Regex = Regex::new(r"[.!?]\s+").unwrap();
}

/// Split text after every `.`, `!` or `?` that is followed by whitespace.
///
/// The punctuation stays with its sentence and the whitespace is dropped.
/// Text after the last boundary is kept as a trailing sentence.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in SENTENCE_BOUNDARY.find_iter(text) {
        // The punctuation mark is a single ASCII byte.
        let end = boundary.start() + 1;
        push_trimmed(&mut sentences, &text[start..end]);
        start = boundary.end();
    }
    push_trimmed(&mut sentences, &text[start..]);

    sentences
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, sentence: &'a str) {
    let trimmed = sentence.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

/// Split a chunk that exceeds `max_tokens` into sentence-aligned sub-chunks.
///
/// Chunks within budget come back unchanged. Sub-chunks are named
/// `<chunk_id>_<k>` from 1 and inherit heading path, pages and block ids.
/// A single sentence larger than the budget becomes its own oversized
/// sub-chunk; it is not cut further.
pub fn split_long_chunk(chunk: &TextChunk, max_tokens: usize) -> Vec<TextChunk> {
    if chunk.token_count <= max_tokens {
        return vec![chunk.clone()];
    }

    let mut pieces = Vec::new();
    let mut buffer = String::new();
    let mut flush = |buffer: &mut String| {
        if !buffer.is_empty() {
            let id = format!("{}_{}", chunk.chunk_id, pieces.len() + 1);
            pieces.push(chunk.derive(id, std::mem::take(buffer)));
        }
    };

    for sentence in split_sentences(&chunk.text) {
        if !buffer.is_empty() && estimate_tokens(&joined(&buffer, sentence)) > max_tokens {
            flush(&mut buffer);
        }
        if !buffer.is_empty() {
            buffer.push(' ');
        }
        buffer.push_str(sentence);

        if estimate_tokens(&buffer) >= max_tokens {
            flush(&mut buffer);
        }
    }
    flush(&mut buffer);

    debug!(
        chunk_id = %chunk.chunk_id,
        tokens = chunk.token_count,
        max_tokens,
        pieces = pieces.len(),
        "Split oversized chunk"
    );
    pieces
}

fn joined(buffer: &str, sentence: &str) -> String {
    let mut candidate = String::with_capacity(buffer.len() + sentence.len() + 1);
    candidate.push_str(buffer);
    candidate.push(' ');
    candidate.push_str(sentence);
    candidate
}

/// Apply [`split_long_chunk`] across a sequence, preserving order.
pub fn split_large_chunks(chunks: &[TextChunk], max_tokens: usize) -> Vec<TextChunk> {
    chunks
        .iter()
        .flat_map(|chunk| split_long_chunk(chunk, max_tokens))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn chunk(text: &str) -> TextChunk {
        TextChunk::new(
            "chunk_1",
            text,
            vec!["Section".to_string()],
            [2, 3],
            vec!["b1".to_string(), "b2".to_string()],
        )
    }

    #[test]
    fn test_sentence_splitting() {
        let sentences = split_sentences("First one. Second one!  Third?\nTrailing part");
        assert_eq!(
            sentences,
            vec!["First one.", "Second one!", "Third?", "Trailing part"]
        );
    }

    #[test]
    fn test_no_boundary_inside_tokens() {
        assert_eq!(
            split_sentences("Version 1.5 is out. See e.g.the notes"),
            vec!["Version 1.5 is out.", "See e.g.the notes"]
        );
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_within_budget_is_identity() {
        let c = chunk("Short text. Nothing to split.");
        assert_eq!(split_long_chunk(&c, 400), vec![c.clone()]);
        assert_eq!(split_long_chunk(&c, c.token_count), vec![c]);
    }

    #[test]
    fn test_split_respects_budget() {
        // 6 words = 8 tokens per sentence, 125 sentences = 1000 tokens.
        let text = "Alpha beta gamma delta epsilon zeta. ".repeat(125);
        let c = chunk(text.trim());
        assert_eq!(c.token_count, 1000);

        let pieces = split_long_chunk(&c, 400);
        let ids: Vec<&str> = pieces.iter().map(|p| p.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["chunk_1_1", "chunk_1_2", "chunk_1_3"]);
        let tokens: Vec<usize> = pieces.iter().map(|p| p.token_count).collect();
        assert_eq!(tokens, vec![400, 400, 200]);

        for piece in &pieces {
            assert_eq!(piece.heading_path, c.heading_path);
            assert_eq!(piece.page_range, c.page_range);
            assert_eq!(piece.block_ids, c.block_ids);
        }
    }

    #[test]
    fn test_flush_before_overflow() {
        // 9 words = 12 tokens per sentence; two fit in 30, a third would not.
        let text = "one two three four five six seven eight nine. ".repeat(5);
        let c = chunk(text.trim());

        let pieces = split_long_chunk(&c, 30);
        assert!(pieces.len() >= 3);
        for piece in &pieces {
            assert!(piece.token_count <= 30, "{} tokens", piece.token_count);
        }
    }

    #[test]
    fn test_unsplittable_run_on_sentence() {
        let text = "word ".repeat(600);
        let c = chunk(text.trim());

        let pieces = split_long_chunk(&c, 400);
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].chunk_id, "chunk_1_1");
        assert_eq!(pieces[0].token_count, 800);
    }

    #[test]
    fn test_oversized_sentence_between_small_ones() {
        let long = "word ".repeat(450);
        let text = format!("Small start. {}. Small end.", long.trim());
        let c = chunk(&text);

        let pieces = split_long_chunk(&c, 400);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].text, "Small start.");
        assert!(pieces[1].token_count > 400);
        assert_eq!(pieces[2].text, "Small end.");
    }

    #[test]
    fn test_split_large_chunks_preserves_order() {
        let small = TextChunk::new("chunk_1", "Tiny.", vec![], [], vec![]);
        let large = TextChunk::new(
            "chunk_2",
            "Alpha beta gamma delta epsilon zeta. ".repeat(10).trim(),
            vec![],
            [],
            vec![],
        );
        let tail = TextChunk::new("chunk_3", "End.", vec![], [], vec![]);

        let result = split_large_chunks(&[small, large, tail], 40);
        let ids: Vec<&str> = result.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["chunk_1", "chunk_2_1", "chunk_2_2", "chunk_3"]);
    }
}
