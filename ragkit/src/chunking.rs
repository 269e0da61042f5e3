//! Document splitting.
//!
//! Splitting happens before embedding: each loaded [`Document`] is cut
//! into pieces small enough to embed and retrieve individually, and each
//! piece keeps the parent document's metadata plus its `chunk_index`.

use serde_json::json;

use crate::document::Document;

/// A strategy for splitting documents into smaller pieces.
pub trait TextSplitter: Send + Sync {
    /// Split each document into pieces of at most the configured size.
    ///
    /// Documents with empty text produce no pieces.
    fn split_documents(&self, documents: &[Document]) -> Vec<Document>;
}

/// Splits text hierarchically: paragraphs, then lines, then words.
///
/// First splits on paragraph separators (`\n\n`). Segments exceeding
/// `chunk_size` are split on line breaks, then on spaces; only at the last
/// level does a plain character split with overlap apply.
#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

/// Separators tried in order, coarsest first.
const SEPARATORS: &[&str] = &["\n\n", "\n", " "];

impl RecursiveSplitter {
    /// Create a new `RecursiveSplitter`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per piece
    /// * `chunk_overlap` — overlapping characters between consecutive pieces
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl TextSplitter for RecursiveSplitter {
    fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut pieces = Vec::new();

        for document in documents {
            if document.text.is_empty() {
                continue;
            }

            let texts =
                split_and_merge(&document.text, self.chunk_size, self.chunk_overlap, SEPARATORS);

            for (i, text) in texts.into_iter().enumerate() {
                let mut metadata = document.metadata.clone();
                metadata.extra.insert("chunk_index".to_string(), json!(i));
                pieces.push(Document { text, metadata });
            }
        }

        pieces
    }
}

/// Split text by a separator, then merge segments into chunks that respect
/// `chunk_size`. A segment that still exceeds `chunk_size` is split further
/// using the next-level separator.
fn split_and_merge(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if text.len() <= chunk_size || separators.is_empty() {
        return split_by_size(text, chunk_size, chunk_overlap);
    }

    let separator = separators[0];
    let remaining_separators = &separators[1..];

    let segments: Vec<&str> = if separator == " " {
        text.split(' ').collect()
    } else {
        split_keeping_separator(text, separator)
    };

    let mut chunks = Vec::new();
    let mut current = String::new();

    for segment in segments {
        if current.is_empty() {
            current = segment.to_string();
        } else if current.len() + segment.len() <= chunk_size {
            current.push_str(segment);
        } else {
            // Current chunk is full — flush it
            if current.len() > chunk_size {
                chunks.extend(split_and_merge(
                    &current,
                    chunk_size,
                    chunk_overlap,
                    remaining_separators,
                ));
            } else {
                chunks.push(current);
            }
            current = segment.to_string();
        }
    }

    if !current.is_empty() {
        if current.len() > chunk_size {
            chunks.extend(split_and_merge(&current, chunk_size, chunk_overlap, remaining_separators));
        } else {
            chunks.push(current);
        }
    }

    chunks
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Plain character-based splitting with overlap.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = (start + chunk_size).min(text.len());
        chunks.push(text[start..end].to_string());
        let step = chunk_size.saturating_sub(chunk_overlap);
        if step == 0 {
            break;
        }
        start += step;
    }

    chunks
}
