//! Property tests for in-memory vector store search ordering.

use ragkit::document::{ChunkMetadata, Document};
use ragkit::inmemory::InMemoryVectorStore;
use ragkit::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a document text paired with a normalized embedding.
fn arb_indexed_document(dim: usize) -> impl Strategy<Value = (Document, Vec<f32>)> {
    ("[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(|(text, embedding)| {
        (Document::new(text, ChunkMetadata::default()), embedding)
    })
}

/// For any set of indexed documents, searching with a query embedding
/// returns distances in ascending order, and the number of results is at
/// most `top_k` and at most the number of indexed documents.
mod prop_inmemory_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded_by_top_k(
            indexed in proptest::collection::vec(arb_indexed_document(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_k in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let (batch, indexed_count) = rt.block_on(async {
                let store = InMemoryVectorStore::new();

                let documents: Vec<Document> = indexed.iter().map(|(d, _)| d.clone()).collect();
                let embeddings: Vec<Vec<f32>> = indexed.iter().map(|(_, e)| e.clone()).collect();
                store.add_documents(&documents, &embeddings).await.unwrap();

                let batch = store.search(&query, top_k).await.unwrap();
                (batch, documents.len())
            });

            let distances = &batch.distances[0];

            // Result count is at most top_k and at most the number of documents
            prop_assert!(distances.len() <= top_k);
            prop_assert!(distances.len() <= indexed_count);

            // Parallel lists stay parallel
            prop_assert_eq!(batch.ids[0].len(), distances.len());
            prop_assert_eq!(batch.documents[0].len(), distances.len());
            prop_assert_eq!(batch.metadatas[0].len(), distances.len());

            // Distances are ordered ascending (best match first)
            for window in distances.windows(2) {
                prop_assert!(
                    window[0] <= window[1],
                    "distances not in ascending order: {} > {}",
                    window[0],
                    window[1],
                );
            }
        }
    }
}
