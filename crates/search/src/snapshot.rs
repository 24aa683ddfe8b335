//! Corpus snapshots
//!
//! A snapshot pairs a reference store with the index built over it. Snapshots
//! are immutable; a reload builds a fresh one and swaps the shared pointer, so
//! a query in flight always sees one complete (store, index) pair.

use crate::indexer::{CorpusIndexer, IndexerConfig};
use crate::retrieval::VectorIndex;
use crate::store::ReferenceStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use solvewithme_common::embeddings::Embedder;
use solvewithme_common::errors::Result;
use solvewithme_common::metrics::record_corpus_load;
use solvewithme_common::models::CorpusRecord;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// An immutable (store, index) pair
#[derive(Debug, Clone)]
pub struct CorpusSnapshot {
    pub id: Uuid,
    pub built_at: DateTime<Utc>,
    pub store: ReferenceStore,
    pub index: VectorIndex,
    pub model: String,
}

/// Snapshot summary for health and reload responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotStatus {
    pub snapshot_id: Uuid,
    pub built_at: DateTime<Utc>,
    pub corpus_size: usize,
    pub fingerprint: String,
    pub index_built: bool,
    pub embedding_model: String,
}

impl CorpusSnapshot {
    /// Load records and index them.
    ///
    /// Invalid records fail the build. An unavailable embedding provider does
    /// not: the snapshot is published with an unbuilt index and every query
    /// returns no neighbors until the next reload.
    #[instrument(skip(records, embedder), fields(records = records.len(), model = %embedder.model_name()))]
    pub async fn build(
        records: Vec<CorpusRecord>,
        embedder: Arc<dyn Embedder>,
        batch_size: usize,
    ) -> Result<Self> {
        let store = ReferenceStore::load(records)?;
        let model = embedder.model_name().to_string();
        let indexer = CorpusIndexer::new(embedder, IndexerConfig { batch_size });

        let (store, index) = match indexer.index(&store).await {
            Ok(embedded) => match VectorIndex::build(&embedded) {
                Ok(index) => (embedded, index),
                Err(e) => {
                    warn!(error = %e, "Index build failed, serving without retrieval");
                    (store, VectorIndex::unbuilt())
                }
            },
            Err(e) => {
                warn!(error = %e, "Embedding provider unavailable, serving without retrieval");
                (store, VectorIndex::unbuilt())
            }
        };

        record_corpus_load(store.len(), index.is_built());

        let snapshot = Self {
            id: Uuid::new_v4(),
            built_at: Utc::now(),
            store,
            index,
            model,
        };

        info!(
            snapshot_id = %snapshot.id,
            corpus_size = snapshot.store.len(),
            index_built = snapshot.index.is_built(),
            "Corpus snapshot built"
        );

        Ok(snapshot)
    }

    pub fn status(&self) -> SnapshotStatus {
        SnapshotStatus {
            snapshot_id: self.id,
            built_at: self.built_at,
            corpus_size: self.store.len(),
            fingerprint: self.store.fingerprint(),
            index_built: self.index.is_built(),
            embedding_model: self.model.clone(),
        }
    }
}

/// Shared pointer to the currently published snapshot
pub struct CorpusHandle {
    current: RwLock<Arc<CorpusSnapshot>>,
}

impl CorpusHandle {
    pub fn new(snapshot: CorpusSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The published snapshot. The lock is held only for the clone.
    pub async fn current(&self) -> Arc<CorpusSnapshot> {
        self.current.read().await.clone()
    }

    /// Replace the published snapshot, returning the previous one
    pub async fn publish(&self, snapshot: CorpusSnapshot) -> Arc<CorpusSnapshot> {
        let snapshot = Arc::new(snapshot);
        let mut guard = self.current.write().await;
        let previous = std::mem::replace(&mut *guard, snapshot);
        drop(guard);

        info!(previous = %previous.id, "Corpus snapshot published");
        previous
    }
}
