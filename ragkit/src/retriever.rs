//! Query-time retrieval from the vector store.
//!
//! The retriever embeds a query, asks the store for nearest neighbors,
//! converts distances to similarity scores, and applies the score
//! threshold with a guaranteed non-empty fallback: thresholding may narrow
//! a result set but never empty one the index considered non-empty.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::document::RetrievedChunk;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// A retrieved document set with its assembled context and sources.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// The retrieved chunks, best first.
    pub documents: Vec<RetrievedChunk>,
    /// Chunk texts joined with a blank line; empty iff `documents` is empty.
    pub context: String,
    /// One source reference per retrieved chunk.
    pub sources: Vec<SourceRef>,
    /// Equal to `documents.len()`.
    pub document_count: usize,
}

/// Where a retrieved chunk came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source file name, `"unknown"` when the chunk has none.
    pub source: String,
    /// Page label, `"N/A"` when the chunk has none.
    pub page: String,
    /// Similarity score of the chunk.
    pub score: f32,
}

/// Retrieves relevant chunks for a query via embedding similarity.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever over the given store and embedding provider.
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, embedder }
    }

    /// Retrieve up to `top_k` chunks relevant to `query`.
    ///
    /// When `score_threshold > 0`, candidates scoring below it are dropped —
    /// unless that would drop every candidate, in which case the unfiltered
    /// top results are returned instead. An empty result therefore means the
    /// index itself found nothing.
    ///
    /// Fails soft: embedding or index errors are logged and collapse into
    /// an empty result. Callers must treat empty-as-valid, not as an error
    /// signal.
    pub async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> Vec<RetrievedChunk> {
        match self.try_retrieve(query, top_k, score_threshold).await {
            Ok(documents) => documents,
            Err(e) => {
                warn!(error = %e, "retrieval failed, returning no documents");
                Vec::new()
            }
        }
    }

    async fn try_retrieve(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> Result<Vec<RetrievedChunk>> {
        debug!(query, top_k, score_threshold, "retrieving documents");

        let query_embedding = self.embedder.embed(query).await?;
        let batch = self.store.search(&query_embedding, top_k).await?;

        let (Some(ids), Some(texts), Some(metadatas), Some(distances)) = (
            batch.ids.first(),
            batch.documents.first(),
            batch.metadatas.first(),
            batch.distances.first(),
        ) else {
            info!("no documents found");
            return Ok(Vec::new());
        };

        if ids.is_empty() {
            info!("no documents found");
            return Ok(Vec::new());
        }

        let candidates: Vec<RetrievedChunk> = ids
            .iter()
            .zip(texts)
            .zip(metadatas)
            .zip(distances)
            .enumerate()
            .map(|(i, (((id, text), metadata), &distance))| RetrievedChunk {
                id: id.clone(),
                text: text.clone(),
                metadata: metadata.clone(),
                similarity_score: 1.0 - distance,
                distance,
                rank: i + 1,
            })
            .collect();

        let retrieved = if score_threshold > 0.0 {
            let kept: Vec<RetrievedChunk> = candidates
                .iter()
                .filter(|c| c.similarity_score >= score_threshold)
                .cloned()
                .collect();

            if kept.is_empty() {
                // Thresholding dropped everything the index considered a
                // plausible neighbor; return the top results unfiltered so
                // the caller still gets context.
                info!(
                    score_threshold,
                    "no documents passed the score threshold, returning top results unfiltered"
                );
                candidates.into_iter().take(top_k).collect()
            } else {
                kept
            }
        } else {
            candidates
        };

        info!(document_count = retrieved.len(), "documents retrieved");
        Ok(retrieved)
    }

    /// Retrieve chunks and assemble the grounded context string.
    ///
    /// `context` joins the chunk texts with a blank line (empty string when
    /// nothing was retrieved); `sources` summarizes each chunk's origin.
    pub async fn retrieve_with_context(
        &self,
        query: &str,
        top_k: usize,
        score_threshold: f32,
    ) -> RetrievalOutcome {
        let documents = self.retrieve(query, top_k, score_threshold).await;

        let context = documents
            .iter()
            .map(|d| d.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        let sources = documents
            .iter()
            .map(|d| SourceRef {
                source: d.metadata.source_label().to_string(),
                page: d.metadata.page_label(),
                score: d.similarity_score,
            })
            .collect();

        let document_count = documents.len();
        RetrievalOutcome { documents, context, sources, document_count }
    }
}
