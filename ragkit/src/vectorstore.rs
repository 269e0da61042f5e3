//! Vector store trait for indexing chunks and answering similarity queries.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::document::{ChunkMetadata, Document};
use crate::error::Result;

/// Results of a nearest-neighbor query in batch form.
///
/// The outer index is the query batch (always size 1 here: one query
/// vector per call); the inner lists are parallel and ordered by ascending
/// distance, best match first. An empty or missing inner list signals that
/// the index held nothing — it is not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryBatch {
    /// Chunk ids per query.
    pub ids: Vec<Vec<String>>,
    /// Chunk texts per query.
    pub documents: Vec<Vec<String>>,
    /// Chunk metadata per query.
    pub metadatas: Vec<Vec<ChunkMetadata>>,
    /// Cosine distances per query, ascending.
    pub distances: Vec<Vec<f32>>,
}

/// A storage backend for chunk embeddings with similarity search.
///
/// Implementations own the indexed [`Chunk`](crate::document::Chunk)s:
/// they assign ids at indexing time and keep chunks immutable afterwards,
/// except for index-wide clears.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Index documents with their pre-computed embeddings.
    ///
    /// `documents` and `embeddings` are parallel; the store assigns each
    /// pair a fresh chunk id and returns the ids in order.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::CountMismatch`](crate::error::RagError::CountMismatch)
    /// when the two slices differ in length. The mismatch is never silently
    /// corrected.
    async fn add_documents(
        &self,
        documents: &[Document],
        embeddings: &[Vec<f32>],
    ) -> Result<Vec<String>>;

    /// Search for the `top_k` chunks nearest to the query embedding.
    ///
    /// Returns a [`QueryBatch`] with inner lists ordered by ascending
    /// distance.
    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<QueryBatch>;

    /// Number of chunks currently indexed.
    async fn count(&self) -> usize;

    /// Remove every chunk from the index.
    async fn clear(&self) -> Result<()>;
}
