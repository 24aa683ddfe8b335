//! Answer result model

use serde::{Deserialize, Serialize};

use crate::context::{Language, Topic};

/// Fixed, non-technical text returned whenever an answer cannot be produced
pub const APOLOGY_TEXT: &str = "I'm having trouble solving this problem. Please try rephrasing your question or ask a teacher for help.";

/// Final answer handed to the message-delivery collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Localized solution text
    pub solution_text: String,

    /// Confidence score (0.0 - 1.0)
    pub confidence: f32,

    /// Solution steps in order of appearance
    pub steps: Vec<String>,

    /// Question texts of the closest reference questions, best first
    pub referenced_questions: Vec<String>,

    /// Detected language of the question
    pub language: Language,

    /// Classified topic of the question
    pub topic: Topic,
}

impl AnswerResult {
    /// The degraded result: apology text, zero confidence, no steps or references
    pub fn apology() -> Self {
        Self {
            solution_text: APOLOGY_TEXT.to_string(),
            confidence: 0.0,
            steps: Vec::new(),
            referenced_questions: Vec::new(),
            language: Language::English,
            topic: Topic::General,
        }
    }

    pub fn is_apology(&self) -> bool {
        self.solution_text == APOLOGY_TEXT && self.confidence == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apology_shape() {
        let result = AnswerResult::apology();
        assert!(result.is_apology());
        assert_eq!(result.confidence, 0.0);
        assert!(result.steps.is_empty());
        assert!(result.referenced_questions.is_empty());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(AnswerResult::apology()).unwrap();
        assert_eq!(json["language"], "english");
        assert_eq!(json["topic"], "general");
        assert!(json["referenced_questions"].as_array().unwrap().is_empty());
    }
}
