//! Data types for documents, indexed chunks, and retrieved matches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata attached to a document or chunk.
///
/// The fields the retrieval path relies on (`source_file`, `page`) are
/// explicit; everything else goes into `extra`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Name of the file the text came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Page number within the source file, when the loader knows it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Open-ended metadata (`file_type`, `chunk_index`, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, Value>,
}

impl ChunkMetadata {
    /// The source file name, or `"unknown"` when absent.
    pub fn source_label(&self) -> &str {
        self.source_file.as_deref().unwrap_or("unknown")
    }

    /// The page number rendered as a string, or `"N/A"` when absent.
    pub fn page_label(&self) -> String {
        self.page.map_or_else(|| "N/A".to_string(), |p| p.to_string())
    }
}

/// A piece of source text before indexing.
///
/// Produced by the loader (one per file) and by the splitter (one per
/// split piece). Gains an id and an embedding only when the vector store
/// indexes it as a [`Chunk`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// The text content.
    pub text: String,
    /// Metadata describing where the text came from.
    pub metadata: ChunkMetadata,
}

impl Document {
    /// Create a new document.
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata) -> Self {
        Self { text: text.into(), metadata }
    }
}

/// An indexed chunk: the tuple the vector store owns.
///
/// Immutable after creation except for index-wide clears.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier assigned at indexing time.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// Metadata inherited from the source document.
    pub metadata: ChunkMetadata,
    /// The embedding vector for this chunk's text.
    pub embedding: Vec<f32>,
}

/// A chunk returned by a retrieval query, with its score and rank.
///
/// Ephemeral, derived per query. `rank` is 1-based in the order the index
/// returned the candidates (ascending distance); the retriever does not
/// re-sort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Identifier of the matched chunk.
    pub id: String,
    /// The text content of the matched chunk.
    pub text: String,
    /// Metadata of the matched chunk.
    pub metadata: ChunkMetadata,
    /// Similarity score, `1 - distance` (higher is more relevant).
    pub similarity_score: f32,
    /// Cosine distance as reported by the index.
    pub distance: f32,
    /// 1-based rank in the order returned by the index.
    pub rank: usize,
}
