//! Answer engine
//!
//! Composes language detection, retrieval, topic classification, synthesis,
//! localization and confidence estimation into one operation that never fails:
//! every error, and any panic inside the composition, becomes the apology
//! result.

use futures::FutureExt;
use regex_lite::Regex;
use solvewithme_common::config::AppConfig;
use solvewithme_common::context::{
    classify, estimate_confidence, localize, Language, Synthesizer,
};
use solvewithme_common::embeddings::Embedder;
use solvewithme_common::errors::{AppError, Result};
use solvewithme_common::metrics::record_answer;
use solvewithme_common::models::{AnswerResult, CorpusRecord, GradeLevel};
use solvewithme_search::{CorpusHandle, CorpusSnapshot, Retriever, SnapshotStatus};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Answer engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Neighbors retrieved per question
    pub top_k: usize,

    /// Neighbors cited in the result
    pub max_references: usize,

    /// Texts per embedding call when re-indexing
    pub index_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            max_references: 2,
            index_batch_size: 32,
        }
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            top_k: config.retrieval.top_k,
            max_references: config.retrieval.max_references,
            index_batch_size: config.embedding.batch_size,
        }
    }
}

/// The answer engine
pub struct AnswerEngine {
    corpus: Arc<CorpusHandle>,
    retriever: Retriever,
    synthesizer: Synthesizer,
    config: EngineConfig,
}

impl AnswerEngine {
    pub fn new(
        corpus: Arc<CorpusHandle>,
        embedder: Arc<dyn Embedder>,
        synthesizer: Synthesizer,
        config: EngineConfig,
    ) -> Self {
        Self {
            corpus,
            retriever: Retriever::new(embedder),
            synthesizer,
            config,
        }
    }

    /// Answer a question. Never fails; degraded answers carry the apology text.
    #[instrument(skip(self, question), fields(grade_level = %grade_level, question_chars = question.chars().count()))]
    pub async fn answer(&self, question: &str, grade_level: GradeLevel) -> AnswerResult {
        let start = Instant::now();

        let result = match AssertUnwindSafe(self.try_answer(question)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                warn!(error = %e, code = ?e.code(), "Answer failed, returning apology");
                AnswerResult::apology()
            }
            Err(_) => {
                error!("Answer pipeline panicked, returning apology");
                AnswerResult::apology()
            }
        };

        record_answer(
            start.elapsed().as_secs_f64(),
            result.topic.as_str(),
            result.language.as_str(),
            result.is_apology(),
            result.confidence,
        );

        info!(
            topic = %result.topic,
            language = %result.language,
            confidence = result.confidence,
            steps = result.steps.len(),
            references = result.referenced_questions.len(),
            "Answer produced"
        );

        result
    }

    /// The fallible composition behind `answer`
    pub async fn try_answer(&self, question: &str) -> Result<AnswerResult> {
        let snapshot = self.corpus.current().await;
        let classified = classify(question);

        let neighbors = self
            .retriever
            .retrieve(&snapshot, question, self.config.top_k)
            .await;
        debug!(
            neighbors = neighbors.len(),
            language = %classified.detected_language,
            topic = %classified.topic,
            difficulty = ?classified.difficulty,
            "Question classified"
        );

        let exemplars: Vec<_> = neighbors.iter().map(|n| n.to_exemplar()).collect();
        let draft = self.synthesizer.try_synthesize(&classified, &exemplars)?;

        let language = classified.detected_language;
        let solution_text = if language == Language::English {
            draft.body
        } else {
            localize(&draft.body, language)
        };

        let scores: Vec<f32> = neighbors.iter().map(|n| n.score()).collect();
        let confidence = estimate_confidence(question, &scores);
        let steps = extract_steps(&solution_text)?;

        let referenced_questions = neighbors
            .iter()
            .take(self.config.max_references)
            .map(|n| n.reference.question_text.clone())
            .collect();

        Ok(AnswerResult {
            solution_text,
            confidence,
            steps,
            referenced_questions,
            language,
            topic: classified.topic,
        })
    }

    /// Summary of the published corpus snapshot
    pub async fn status(&self) -> SnapshotStatus {
        self.corpus.current().await.status()
    }

    /// Build a snapshot from `records` and publish it.
    ///
    /// On a load error nothing is published and the current snapshot keeps
    /// serving. A snapshot whose index could not be built never replaces one
    /// whose index was.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub async fn reload(&self, records: Vec<CorpusRecord>) -> Result<SnapshotStatus> {
        let snapshot = CorpusSnapshot::build(
            records,
            self.retriever.embedder().clone(),
            self.config.index_batch_size,
        )
        .await?;

        let status = snapshot.status();
        if !status.index_built && self.corpus.current().await.status().index_built {
            warn!(
                snapshot_id = %status.snapshot_id,
                "Reload produced no index, keeping current snapshot"
            );
            return Err(AppError::EmbeddingUnavailable {
                message: "corpus could not be indexed, current snapshot kept".to_string(),
            });
        }

        self.corpus.publish(snapshot).await;
        Ok(status)
    }
}

/// Lines that mention a step or start with a list number, trimmed
pub fn extract_steps(text: &str) -> Result<Vec<String>> {
    let numbered = Regex::new(r"^\d+\.").map_err(|e| AppError::Internal {
        message: format!("step pattern failed to compile: {}", e),
    })?;

    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| line.to_lowercase().contains("step") || numbered.is_match(line))
        .map(str::to_string)
        .collect())
}
