//! Corpus indexer
//!
//! Runs the reference question texts through the embedding provider in
//! batches and attaches the resulting vectors to a new store.

use crate::store::ReferenceStore;
use solvewithme_common::embeddings::Embedder;
use solvewithme_common::errors::{AppError, Result};
use solvewithme_common::metrics::record_embedding;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument};

/// Corpus indexer configuration
#[derive(Debug, Clone)]
pub struct IndexerConfig {
    /// Texts per embedding call
    pub batch_size: usize,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self { batch_size: 32 }
    }
}

/// Embeds a reference store
pub struct CorpusIndexer {
    embedder: Arc<dyn Embedder>,
    config: IndexerConfig,
}

impl CorpusIndexer {
    pub fn new(embedder: Arc<dyn Embedder>, config: IndexerConfig) -> Self {
        Self { embedder, config }
    }

    /// Embed every question and return the store with embeddings attached.
    ///
    /// A provider failure fails the whole run; no partial store is produced.
    #[instrument(skip(self, store), fields(corpus_size = store.len(), model = %self.embedder.model_name()))]
    pub async fn index(&self, store: &ReferenceStore) -> Result<ReferenceStore> {
        let texts = store.texts();
        let batch_size = self.config.batch_size.max(1);
        let mut vectors = Vec::with_capacity(texts.len());

        for (batch_number, batch) in texts.chunks(batch_size).enumerate() {
            debug!(
                batch = batch_number,
                batch_size = batch.len(),
                processed = vectors.len(),
                total = texts.len(),
                "Embedding batch"
            );

            let start = Instant::now();
            let result = self.embedder.embed_batch(batch).await;
            record_embedding(
                start.elapsed().as_secs_f64(),
                self.embedder.model_name(),
                batch.len(),
                result.is_ok(),
            );

            let embeddings = result?;
            if embeddings.len() != batch.len() {
                return Err(AppError::EmbeddingUnavailable {
                    message: format!(
                        "expected {} embeddings, received {}",
                        batch.len(),
                        embeddings.len()
                    ),
                });
            }
            vectors.extend(embeddings);
        }

        info!(vectors = vectors.len(), "Corpus embedded");
        store.with_embeddings(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use solvewithme_common::embeddings::HashingEmbedder;
    use solvewithme_common::models::{CorpusRecord, ExamSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts batch calls and returns one short vector per text
    struct CountingEmbedder {
        calls: AtomicUsize,
        drop_last: bool,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let count = if self.drop_last { texts.len() - 1 } else { texts.len() };
            Ok(vec![vec![1.0, 0.0]; count])
        }

        fn model_name(&self) -> &str {
            "counting"
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    fn store(size: usize) -> ReferenceStore {
        let records = (0..size)
            .map(|i| CorpusRecord::new(format!("Solve question {}", i), "answer", ExamSource::Waec, 2020, "Algebra"))
            .collect();
        ReferenceStore::load(records).unwrap()
    }

    #[tokio::test]
    async fn test_index_batches_texts() {
        let embedder = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0), drop_last: false });
        let indexer = CorpusIndexer::new(embedder.clone(), IndexerConfig { batch_size: 4 });

        let indexed = indexer.index(&store(10)).await.unwrap();
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);
        assert!(indexed.list_all().iter().all(|q| q.embedding.is_some()));
    }

    #[tokio::test]
    async fn test_short_batch_is_an_error() {
        let embedder = Arc::new(CountingEmbedder { calls: AtomicUsize::new(0), drop_last: true });
        let indexer = CorpusIndexer::new(embedder, IndexerConfig::default());

        assert!(matches!(
            indexer.index(&store(3)).await,
            Err(AppError::EmbeddingUnavailable { .. })
        ));
    }

    #[tokio::test]
    async fn test_hashing_embeddings_are_unit_length() {
        let indexer = CorpusIndexer::new(Arc::new(HashingEmbedder::new(64)), IndexerConfig::default());
        let indexed = indexer.index(&store(5)).await.unwrap();

        for question in indexed.list_all() {
            let embedding = question.embedding.as_ref().unwrap();
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5);
        }
    }
}
