//! Reference store
//!
//! The ordered, immutable corpus of solved exam questions. Identifiers are
//! assigned by load order, which is also the tie-break order for retrieval.

use sha2::{Digest, Sha256};
use solvewithme_common::embeddings::normalize;
use solvewithme_common::errors::{AppError, Result};
use solvewithme_common::models::{CorpusRecord, ReferenceId, ReferenceQuestion};
use std::sync::Arc;

/// Immutable corpus of reference questions
#[derive(Debug, Clone)]
pub struct ReferenceStore {
    questions: Arc<[ReferenceQuestion]>,
}

impl ReferenceStore {
    /// Build a store from ingestion records.
    ///
    /// Fails with a load error when there are no records or any record lacks
    /// a required field. Blank strings count as missing.
    pub fn load(records: Vec<CorpusRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(AppError::Load {
                message: "corpus is empty".to_string(),
            });
        }

        let questions = records
            .into_iter()
            .enumerate()
            .map(|(id, record)| into_reference(id, record))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            questions: questions.into(),
        })
    }

    pub fn list_all(&self) -> &[ReferenceQuestion] {
        &self.questions
    }

    pub fn get_by_id(&self, id: ReferenceId) -> Option<&ReferenceQuestion> {
        self.questions.get(id)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Question texts in load order
    pub fn texts(&self) -> Vec<String> {
        self.questions.iter().map(|q| q.question_text.clone()).collect()
    }

    /// SHA-256 over the question texts, hex encoded
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for question in self.questions.iter() {
            hasher.update(question.question_text.as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    /// Return a new store with one normalized embedding attached per question
    pub fn with_embeddings(&self, vectors: Vec<Vec<f32>>) -> Result<Self> {
        if vectors.len() != self.questions.len() {
            return Err(AppError::Load {
                message: format!(
                    "received {} embeddings for {} reference questions",
                    vectors.len(),
                    self.questions.len()
                ),
            });
        }

        let questions: Vec<ReferenceQuestion> = self
            .questions
            .iter()
            .zip(vectors)
            .map(|(question, mut vector)| {
                normalize(&mut vector);
                ReferenceQuestion {
                    embedding: Some(vector.into()),
                    ..question.clone()
                }
            })
            .collect();

        Ok(Self {
            questions: questions.into(),
        })
    }
}

fn required_text(value: Option<String>, index: usize, field: &str) -> Result<String> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(AppError::MissingField {
            index,
            field: field.to_string(),
        }),
    }
}

fn into_reference(id: ReferenceId, record: CorpusRecord) -> Result<ReferenceQuestion> {
    let question_text = required_text(record.question, id, "question")?;
    let answer_text = required_text(record.answer, id, "answer")?;
    let topic = required_text(record.topic, id, "topic")?;
    let source = record.source.ok_or_else(|| AppError::MissingField {
        index: id,
        field: "source".to_string(),
    })?;
    let year = record.year.ok_or_else(|| AppError::MissingField {
        index: id,
        field: "year".to_string(),
    })?;

    Ok(ReferenceQuestion {
        id,
        question_text,
        answer_text,
        source,
        year,
        topic,
        embedding: None,
    })
}
