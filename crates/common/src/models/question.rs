//! Reference question model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::AppError;

/// Stable corpus identifier, assigned by load order
pub type ReferenceId = usize;

/// Examination body a reference question was taken from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamSource {
    Waec,
    Jamb,
}

impl ExamSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamSource::Waec => "WAEC",
            ExamSource::Jamb => "JAMB",
        }
    }
}

impl fmt::Display for ExamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Senior secondary class of the student asking
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum GradeLevel {
    SS1,
    #[default]
    SS2,
    SS3,
}

impl GradeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLevel::SS1 => "SS1",
            GradeLevel::SS2 => "SS2",
            GradeLevel::SS3 => "SS3",
        }
    }
}

impl fmt::Display for GradeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GradeLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SS1" => Ok(GradeLevel::SS1),
            "SS2" => Ok(GradeLevel::SS2),
            "SS3" => Ok(GradeLevel::SS3),
            other => Err(AppError::Validation {
                message: format!("unknown grade level '{}', expected SS1, SS2 or SS3", other),
                field: Some("grade_level".to_string()),
            }),
        }
    }
}

/// Corpus ingestion record.
///
/// Every field is optional at the wire level so that a missing field surfaces
/// as a load error naming the record, not as an opaque parse failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusRecord {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub source: Option<ExamSource>,
    pub year: Option<u16>,
    pub topic: Option<String>,
}

impl CorpusRecord {
    /// Convenience constructor for a fully populated record
    pub fn new(
        question: impl Into<String>,
        answer: impl Into<String>,
        source: ExamSource,
        year: u16,
        topic: impl Into<String>,
    ) -> Self {
        Self {
            question: Some(question.into()),
            answer: Some(answer.into()),
            source: Some(source),
            year: Some(year),
            topic: Some(topic.into()),
        }
    }
}

/// A solved exam question in the reference corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceQuestion {
    /// Load-order identifier
    pub id: ReferenceId,

    /// Question text as stored in the corpus
    pub question_text: String,

    /// Verified answer text
    pub answer_text: String,

    /// Examination body
    pub source: ExamSource,

    /// Examination year
    pub year: u16,

    /// Curated topic label
    pub topic: String,

    /// Unit-length embedding, attached once the corpus is indexed
    #[serde(skip)]
    pub embedding: Option<Arc<[f32]>>,
}
