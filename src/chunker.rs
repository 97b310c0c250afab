//! Sentence-boundary text chunker.
//!
//! Splits email body text into segments that respect a configurable
//! `max_chunk_size` limit. Splitting occurs on sentence boundaries
//! (`.`, `!`, `?`) to preserve semantic coherence within each chunk;
//! sentences that are individually too long fall back to word-boundary
//! splitting. Output is fully deterministic for a given input.

use crate::models::{Chunk, EmailDocument};

/// Split text into chunks on sentence boundaries, respecting `max_chunk_size`.
///
/// - Empty or whitespace-only text yields no chunks.
/// - Text already within the limit is returned unchanged as a single chunk.
/// - Otherwise sentences (delimited by `.`, `!`, `?`, delimiters removed,
///   trimmed, empties dropped) are greedily accumulated, joined with `". "`,
///   and flushed whenever the next sentence would push the chunk past the
///   limit.
/// - A single sentence longer than the limit is split on word boundaries
///   instead; words are never split, so a lone word longer than the limit
///   becomes an oversized chunk of its own.
pub fn split_text(text: &str, max_chunk_size: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    if text.len() <= max_chunk_size {
        return vec![text.to_string()];
    }

    let sentences = text
        .split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        // Over-long sentence: flush the running chunk and fall back to
        // word-boundary splitting, then continue accumulating from empty.
        if sentence.len() > max_chunk_size {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
            }
            chunks.extend(split_words(sentence, max_chunk_size));
            continue;
        }

        let would_be = if current.is_empty() {
            sentence.len()
        } else {
            current.len() + 2 + sentence.len() // +2 for ". " joiner
        };

        if would_be > max_chunk_size && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push_str(". ");
        }
        current.push_str(sentence);
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Greedily pack whole words (split on single spaces) into chunks of at most
/// `max_chunk_size`. A word longer than the limit is emitted as-is.
fn split_words(sentence: &str, max_chunk_size: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();

    for word in sentence.split(' ').filter(|w| !w.is_empty()) {
        let would_be = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };

        if would_be > max_chunk_size && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        out.push(current);
    }

    out
}

/// Split a stored email into provenance-tagged chunks.
///
/// Indices are 1-based and contiguous; `total_chunks` is the same for every
/// chunk of the document.
pub fn chunk_document(doc: &EmailDocument, max_chunk_size: usize) -> Vec<Chunk> {
    let pieces = split_text(&doc.content, max_chunk_size);
    let total = pieces.len();

    pieces
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk {
            source_document_id: doc.id,
            index: i + 1,
            total_chunks: total,
            size: text.len(),
            text,
        })
        .collect()
}
