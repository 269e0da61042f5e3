//! In-memory vector store using cosine distance.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by
//! a `Vec` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and single-process deployments; a persistent
//! index engine can replace it behind the same [`VectorStore`] trait.

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};
use crate::vectorstore::{QueryBatch, VectorStore};

/// An in-memory vector store using cosine distance for search.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    chunks: RwLock<Vec<Chunk>>,
}

impl InMemoryVectorStore {
    /// Create a new empty in-memory vector store.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn add_documents(
        &self,
        documents: &[Document],
        embeddings: &[Vec<f32>],
    ) -> Result<Vec<String>> {
        if documents.len() != embeddings.len() {
            return Err(RagError::CountMismatch {
                documents: documents.len(),
                embeddings: embeddings.len(),
            });
        }

        let mut chunks = self.chunks.write().await;
        let mut ids = Vec::with_capacity(documents.len());

        for (i, (document, embedding)) in documents.iter().zip(embeddings).enumerate() {
            let uuid = Uuid::new_v4().simple().to_string();
            let id = format!("doc_{}_{i}", &uuid[..8]);

            let mut metadata = document.metadata.clone();
            metadata.extra.insert("doc_index".to_string(), json!(i));
            metadata.extra.insert("content_length".to_string(), json!(document.text.len()));

            chunks.push(Chunk {
                id: id.clone(),
                text: document.text.clone(),
                metadata,
                embedding: embedding.clone(),
            });
            ids.push(id);
        }

        info!(added = ids.len(), total = chunks.len(), "documents added to vector store");
        Ok(ids)
    }

    async fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<QueryBatch> {
        let chunks = self.chunks.read().await;

        let mut scored: Vec<(&Chunk, f32)> = chunks
            .iter()
            .map(|chunk| {
                let distance = 1.0 - cosine_similarity(&chunk.embedding, query_embedding);
                (chunk, distance)
            })
            .collect();

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);

        let mut batch = QueryBatch {
            ids: vec![Vec::with_capacity(scored.len())],
            documents: vec![Vec::with_capacity(scored.len())],
            metadatas: vec![Vec::with_capacity(scored.len())],
            distances: vec![Vec::with_capacity(scored.len())],
        };
        for (chunk, distance) in scored {
            batch.ids[0].push(chunk.id.clone());
            batch.documents[0].push(chunk.text.clone());
            batch.metadatas[0].push(chunk.metadata.clone());
            batch.distances[0].push(distance);
        }

        Ok(batch)
    }

    async fn count(&self) -> usize {
        self.chunks.read().await.len()
    }

    async fn clear(&self) -> Result<()> {
        self.chunks.write().await.clear();
        info!("vector store cleared");
        Ok(())
    }
}
