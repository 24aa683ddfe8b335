//! In-memory vector similarity index
//!
//! Exact inner-product search over unit vectors. The corpus is small (exam
//! questions, not documents), so a linear scan is the whole algorithm.

use super::SimilarityResult;
use crate::store::ReferenceStore;
use solvewithme_common::embeddings::normalize;
use solvewithme_common::errors::{AppError, Result};
use std::sync::Arc;
use tracing::{debug, warn};

/// Scores closer than this are treated as equal and keep corpus order
const TIE_TOLERANCE: f32 = 1e-6;

/// Vector index over the reference store embeddings
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    dimension: usize,
    vectors: Vec<Arc<[f32]>>,
    built: bool,
}

impl VectorIndex {
    /// An index that answers every query with no results
    pub fn unbuilt() -> Self {
        Self::default()
    }

    /// Build the index from a store whose questions all carry embeddings
    pub fn build(store: &ReferenceStore) -> Result<Self> {
        let mut vectors = Vec::with_capacity(store.len());
        let mut dimension = None;

        for question in store.list_all() {
            let embedding = question.embedding.clone().ok_or_else(|| AppError::Load {
                message: format!("reference question {} has no embedding", question.id),
            })?;

            match dimension {
                None => dimension = Some(embedding.len()),
                Some(expected) if expected != embedding.len() => {
                    return Err(AppError::DimensionMismatch {
                        expected,
                        actual: embedding.len(),
                    });
                }
                Some(_) => {}
            }
            vectors.push(embedding);
        }

        let dimension = dimension.unwrap_or(0);
        if dimension == 0 {
            return Err(AppError::Load {
                message: "cannot index an empty corpus".to_string(),
            });
        }

        Ok(Self {
            dimension,
            vectors,
            built: true,
        })
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Top `min(k, len)` results by descending similarity.
    ///
    /// An unbuilt index, a query of the wrong dimension and a zero query all
    /// return an empty result rather than an error.
    pub fn query(&self, query: &[f32], k: usize) -> Vec<SimilarityResult> {
        if !self.built || k == 0 {
            return Vec::new();
        }

        if query.len() != self.dimension {
            warn!(
                expected = self.dimension,
                actual = query.len(),
                "Query embedding has the wrong dimension"
            );
            return Vec::new();
        }

        let mut query = query.to_vec();
        normalize(&mut query);
        if query.iter().all(|x| *x == 0.0) {
            debug!("Zero query embedding, nothing to rank");
            return Vec::new();
        }

        let mut scored: Vec<(i64, usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, vector)| {
                let score = dot(&query, vector).clamp(-1.0, 1.0);
                (quantize(score), id, score)
            })
            .collect();

        // stable sort: equal buckets keep insertion order
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(k);

        scored
            .into_iter()
            .enumerate()
            .map(|(rank, (_, reference_id, score))| SimilarityResult {
                reference_id,
                score,
                rank,
            })
            .collect()
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn quantize(score: f32) -> i64 {
    (score / TIE_TOLERANCE).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use solvewithme_common::models::{CorpusRecord, ExamSource};

    fn store_with(vectors: Vec<Vec<f32>>) -> ReferenceStore {
        let records = (0..vectors.len())
            .map(|i| CorpusRecord::new(format!("question {}", i), "answer", ExamSource::Jamb, 2021, "Algebra"))
            .collect();
        ReferenceStore::load(records).unwrap().with_embeddings(vectors).unwrap()
    }

    fn random_vectors(rng: &mut StdRng, count: usize, dimension: usize) -> Vec<Vec<f32>> {
        (0..count)
            .map(|_| (0..dimension).map(|_| rng.gen_range(-1.0..1.0)).collect())
            .collect()
    }

    #[test]
    fn test_query_returns_min_k_n_sorted() {
        let mut rng = StdRng::seed_from_u64(7);
        let index = VectorIndex::build(&store_with(random_vectors(&mut rng, 20, 16))).unwrap();
        let query: Vec<f32> = (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect();

        for k in [1, 3, 20, 50] {
            let results = index.query(&query, k);
            assert_eq!(results.len(), k.min(20));
            assert!(results.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
            assert!(results.windows(2).all(|w| w[0].score >= w[1].score - TIE_TOLERANCE));
            assert!(results.iter().enumerate().all(|(i, r)| r.rank == i));
        }
    }

    #[test]
    fn test_self_query_ranks_first() {
        let mut rng = StdRng::seed_from_u64(11);
        let vectors = random_vectors(&mut rng, 10, 8);
        let index = VectorIndex::build(&store_with(vectors.clone())).unwrap();

        let results = index.query(&vectors[4], 1);
        assert_eq!(results[0].reference_id, 4);
        assert!((results[0].score - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let index = VectorIndex::build(&store_with(vec![
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
        ]))
        .unwrap();

        let ids: Vec<usize> = index.query(&[1.0, 0.0], 4).iter().map(|r| r.reference_id).collect();
        assert_eq!(ids, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_degenerate_queries_are_empty() {
        let index = VectorIndex::build(&store_with(vec![vec![1.0, 0.0], vec![0.0, 1.0]])).unwrap();
        assert!(index.query(&[1.0, 0.0, 0.0], 2).is_empty());
        assert!(index.query(&[0.0, 0.0], 2).is_empty());
        assert!(index.query(&[1.0, 0.0], 0).is_empty());

        let unbuilt = VectorIndex::unbuilt();
        assert!(!unbuilt.is_built());
        assert!(unbuilt.query(&[1.0, 0.0], 3).is_empty());
    }

    #[test]
    fn test_build_requires_consistent_embeddings() {
        let records = vec![CorpusRecord::new("q", "a", ExamSource::Waec, 2020, "Algebra")];
        let bare = ReferenceStore::load(records).unwrap();
        assert!(VectorIndex::build(&bare).unwrap_err().is_load_error());

        let mixed = store_with(vec![vec![1.0, 0.0], vec![1.0, 0.0, 0.0]]);
        assert!(matches!(
            VectorIndex::build(&mixed),
            Err(AppError::DimensionMismatch { expected: 2, actual: 3 })
        ));
    }
}
