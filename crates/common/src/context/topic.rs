//! Topic Classifier - keyword scoring over a fixed topic taxonomy
//!
//! Provides:
//! - Topic classification (argmax of keyword hits, ties to declaration order)
//! - Difficulty estimation
//! - The combined `ClassifiedQuestion` consumed by synthesis

use serde::{Deserialize, Serialize};
use std::fmt;

use super::language::{detect_language, Language};

/// Mathematical topic of a question
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Algebra,
    Geometry,
    Probability,
    Calculus,
    #[default]
    General,
}

/// Scored topics in declaration order. `General` is the zero-score fallback.
const TAXONOMY: [Topic; 4] = [Topic::Algebra, Topic::Geometry, Topic::Probability, Topic::Calculus];

impl Topic {
    /// Keywords counted towards this topic
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Topic::Algebra => &[
                "solve", "equation", "find x", "=", "factorize", "factorise",
                "simplify", "variable", "linear", "quadratic",
            ],
            Topic::Geometry => &[
                "area", "volume", "perimeter", "circle", "triangle",
                "rectangle", "radius", "angle",
            ],
            Topic::Probability => &["probability", "chance", "likely", "dice", "coin"],
            Topic::Calculus => &["derivative", "integral", "limit", "differentiate", "integrate"],
            Topic::General => &[],
        }
    }

    /// Number of this topic's keywords present in already lower-cased text
    pub fn score(&self, lowered: &str) -> usize {
        self.keywords().iter().filter(|k| lowered.contains(*k)).count()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Algebra => "algebra",
            Topic::Geometry => "geometry",
            Topic::Probability => "probability",
            Topic::Calculus => "calculus",
            Topic::General => "general",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the topic of a question
pub fn classify_topic(text: &str) -> Topic {
    let lowered = text.to_lowercase();

    let mut best = Topic::General;
    let mut best_score = 0;
    for topic in TAXONOMY {
        let score = topic.score(&lowered);
        // strictly greater keeps the earlier topic on ties
        if score > best_score {
            best = topic;
            best_score = score;
        }
    }
    best
}

/// Rough difficulty of a question
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

const EASY_INDICATORS: &[&str] = &["add", "subtract", "multiply", "divide", "simple", "basic"];
const MEDIUM_INDICATORS: &[&str] = &["solve", "find", "calculate", "equation", "formula"];
const HARD_INDICATORS: &[&str] = &["prove", "derive", "complex", "advanced", "integral", "derivative"];

fn hits(lowered: &str, indicators: &[&str]) -> usize {
    indicators.iter().filter(|i| lowered.contains(*i)).count()
}

/// Estimate how hard a question is from its wording
pub fn estimate_difficulty(text: &str) -> Difficulty {
    let lowered = text.to_lowercase();

    if hits(&lowered, HARD_INDICATORS) > 0 {
        Difficulty::Hard
    } else if hits(&lowered, MEDIUM_INDICATORS) > hits(&lowered, EASY_INDICATORS) {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

/// A question with its detected language, topic and difficulty
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifiedQuestion {
    pub raw_text: String,
    pub detected_language: Language,
    pub topic: Topic,
    pub difficulty: Difficulty,
}

/// Run language detection, topic classification and difficulty estimation
pub fn classify(text: &str) -> ClassifiedQuestion {
    ClassifiedQuestion {
        raw_text: text.to_string(),
        detected_language: detect_language(text),
        topic: classify_topic(text),
        difficulty: estimate_difficulty(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algebra() {
        assert_eq!(classify_topic("Solve for x: 2x+5=13"), Topic::Algebra);
        assert_eq!(classify_topic("2x + 5 = 13"), Topic::Algebra);
        assert_eq!(classify_topic("Factorize x² - 9"), Topic::Algebra);
    }

    #[test]
    fn test_geometry() {
        assert_eq!(
            classify_topic("Find the area of a circle with radius 7cm"),
            Topic::Geometry
        );
    }

    #[test]
    fn test_probability_and_calculus() {
        assert_eq!(classify_topic("What is the chance of rolling a six on a dice?"), Topic::Probability);
        assert_eq!(classify_topic("Differentiate 3x^2 + 2"), Topic::Calculus);
    }

    #[test]
    fn test_keyword_free_text_is_general() {
        assert_eq!(classify_topic("hello there friend"), Topic::General);
        assert_eq!(classify_topic(""), Topic::General);
    }

    #[test]
    fn test_tie_goes_to_declaration_order() {
        // one algebra hit ("solve") and one geometry hit ("area")
        assert_eq!(classify_topic("solve area"), Topic::Algebra);
        // one geometry hit ("circle") and one probability hit ("coin")
        assert_eq!(classify_topic("circle coin"), Topic::Geometry);
    }

    #[test]
    fn test_higher_score_wins_over_order() {
        // algebra: "=" ; geometry: "area", "triangle", "angle"
        assert_eq!(classify_topic("area of triangle = ?"), Topic::Geometry);
    }

    #[test]
    fn test_difficulty() {
        assert_eq!(estimate_difficulty("Find the derivative of x^2"), Difficulty::Hard);
        assert_eq!(estimate_difficulty("Solve for x: 2x+5=13"), Difficulty::Medium);
        assert_eq!(estimate_difficulty("add 2 and 3"), Difficulty::Easy);
    }

    #[test]
    fn test_classify_combines_stages() {
        let classified = classify("Solve for x: 2x+5=13");
        assert_eq!(classified.detected_language, Language::English);
        assert_eq!(classified.topic, Topic::Algebra);
        assert_eq!(classified.raw_text, "Solve for x: 2x+5=13");
    }
}
