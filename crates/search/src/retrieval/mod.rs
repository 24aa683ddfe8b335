//! Nearest-neighbor retrieval over the published corpus snapshot
//!
//! Provides:
//! - The in-memory vector index
//! - A retriever that embeds a question and joins results back to the store
//!
//! Retrieval never fails outward. An unavailable embedding provider or an
//! unbuilt index yields an empty neighbor list.

mod vector;

pub use vector::VectorIndex;

use crate::snapshot::CorpusSnapshot;
use serde::{Deserialize, Serialize};
use solvewithme_common::context::Exemplar;
use solvewithme_common::embeddings::Embedder;
use solvewithme_common::metrics::{record_embedding, record_retrieval};
use solvewithme_common::models::{ReferenceId, ReferenceQuestion};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// One ranked hit from the similarity index
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// Corpus identifier of the hit
    pub reference_id: ReferenceId,

    /// Cosine similarity (-1.0 - 1.0)
    pub score: f32,

    /// Zero-based position in the result list
    pub rank: usize,
}

/// A similarity result joined with its reference question
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub result: SimilarityResult,
    pub reference: ReferenceQuestion,
}

impl Neighbor {
    pub fn score(&self) -> f32 {
        self.result.score
    }

    /// View this neighbor as worked context for synthesis
    pub fn to_exemplar(&self) -> Exemplar {
        Exemplar {
            question: self.reference.question_text.clone(),
            answer: self.reference.answer_text.clone(),
            source: self.reference.source,
            year: self.reference.year,
            similarity: self.result.score,
        }
    }
}

/// Embeds questions and queries the snapshot index
#[derive(Clone)]
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self { embedder }
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Retrieve up to `k` neighbors for a question, best first
    #[instrument(skip(self, snapshot, question), fields(snapshot_id = %snapshot.id))]
    pub async fn retrieve(&self, snapshot: &CorpusSnapshot, question: &str, k: usize) -> Vec<Neighbor> {
        if !snapshot.index.is_built() {
            debug!("Index not built, skipping retrieval");
            return Vec::new();
        }

        let start = Instant::now();
        let embedding = match self.embedder.embed(question).await {
            Ok(embedding) => {
                record_embedding(
                    start.elapsed().as_secs_f64(),
                    self.embedder.model_name(),
                    1,
                    true,
                );
                embedding
            }
            Err(e) => {
                record_embedding(
                    start.elapsed().as_secs_f64(),
                    self.embedder.model_name(),
                    1,
                    false,
                );
                warn!(error = %e, "Embedding unavailable, answering without neighbors");
                return Vec::new();
            }
        };

        let neighbors: Vec<Neighbor> = snapshot
            .index
            .query(&embedding, k)
            .into_iter()
            .filter_map(|result| {
                snapshot.store.get_by_id(result.reference_id).map(|reference| Neighbor {
                    result,
                    reference: reference.clone(),
                })
            })
            .collect();

        record_retrieval(start.elapsed().as_secs_f64(), neighbors.len());
        debug!(results = neighbors.len(), "Retrieval complete");

        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::default_records;
    use async_trait::async_trait;
    use futures::future::join_all;
    use solvewithme_common::embeddings::HashingEmbedder;
    use solvewithme_common::errors::{AppError, Result};

    struct UnreachableEmbedder;

    #[async_trait]
    impl Embedder for UnreachableEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Err(AppError::EmbeddingUnavailable {
                message: "connection refused".to_string(),
            })
        }

        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Err(AppError::EmbeddingUnavailable {
                message: "connection refused".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "unreachable"
        }

        fn dimension(&self) -> usize {
            64
        }
    }

    async fn seed_snapshot(embedder: Arc<dyn Embedder>) -> CorpusSnapshot {
        CorpusSnapshot::build(default_records().unwrap(), embedder, 16)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_exact_question_ranks_first() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(256));
        let snapshot = seed_snapshot(embedder.clone()).await;
        let retriever = Retriever::new(embedder);

        let neighbors = retriever.retrieve(&snapshot, "Solve for x: 2x + 5 = 13", 3).await;
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].reference.id, 0);
        assert!((neighbors[0].score() - 1.0).abs() < 1e-5);

        let exemplar = neighbors[0].to_exemplar();
        assert_eq!(exemplar.question, "Solve for x: 2x + 5 = 13");
        assert!(exemplar.answer.starts_with("x = 4"));
    }

    #[tokio::test]
    async fn test_provider_failure_yields_no_neighbors() {
        let snapshot = seed_snapshot(Arc::new(HashingEmbedder::new(64))).await;
        let retriever = Retriever::new(Arc::new(UnreachableEmbedder));

        assert!(retriever.retrieve(&snapshot, "Factorize x² - 9", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_unbuilt_index_yields_no_neighbors() {
        let snapshot = seed_snapshot(Arc::new(UnreachableEmbedder)).await;
        let retriever = Retriever::new(Arc::new(HashingEmbedder::new(64)));

        assert!(retriever.retrieve(&snapshot, "Factorize x² - 9", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_retrievals_agree() {
        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(128));
        let snapshot = Arc::new(seed_snapshot(embedder.clone()).await);
        let retriever = Retriever::new(embedder);

        let runs = join_all((0..8).map(|_| {
            let snapshot = snapshot.clone();
            let retriever = retriever.clone();
            async move {
                retriever
                    .retrieve(&snapshot, "Find the area of a circle with radius 7cm", 3)
                    .await
                    .iter()
                    .map(|n| n.reference.id)
                    .collect::<Vec<_>>()
            }
        }))
        .await;

        assert!(runs.iter().all(|ids| ids == &runs[0]));
        assert_eq!(runs[0][0], 1);
    }
}
