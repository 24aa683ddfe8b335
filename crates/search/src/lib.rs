//! SolveWithMe Search Library
//!
//! Retrieval over the reference corpus of solved exam questions:
//! - Immutable reference store with load-order identifiers
//! - Batched corpus indexing through the embedding provider
//! - Exact in-memory similarity index
//! - Atomically published corpus snapshots
//! - The built-in seed corpus

pub mod indexer;
pub mod retrieval;
pub mod seed;
pub mod snapshot;
pub mod store;

pub use retrieval::{Neighbor, Retriever, SimilarityResult, VectorIndex};
pub use snapshot::{CorpusHandle, CorpusSnapshot, SnapshotStatus};
pub use store::ReferenceStore;
