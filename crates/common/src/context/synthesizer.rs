//! Solution Synthesizer - topic-routed solution scaffolds
//!
//! Provides:
//! - Algebra: equation extraction and a three-step solving scaffold
//! - Geometry: canned formula scaffolds with a worked example
//! - General: a four-step problem-solving scaffold (also used for probability and calculus)
//! - Retrieved exemplars appended verbatim as worked context
//!
//! Synthesis never fails outward: any internal error becomes the apology draft.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::topic::{ClassifiedQuestion, Topic};
use crate::errors::{AppError, Result};
use crate::models::{ExamSource, APOLOGY_TEXT};

/// Characters that may appear inside an equation
const EQUATION_PATTERN: &str = r"[0-9xyzXYZ+\-*/\^().=²³×÷\s]+";

/// A retrieved reference question used as worked context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exemplar {
    pub question: String,
    pub answer: String,
    pub source: ExamSource,
    pub year: u16,
    pub similarity: f32,
}

/// Draft solution before localization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolutionDraft {
    /// Full English solution text
    pub body: String,

    /// Scaffold steps, in order
    pub steps: Vec<String>,
}

impl SolutionDraft {
    pub fn apology() -> Self {
        Self {
            body: APOLOGY_TEXT.to_string(),
            steps: Vec::new(),
        }
    }
}

/// Synthesis options
#[derive(Debug, Clone)]
pub struct SynthesisOptions {
    /// Exemplars appended to a draft
    pub max_exemplars: usize,

    /// Longest question accepted, in characters
    pub max_question_chars: usize,
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            max_exemplars: 2,
            max_question_chars: 2000,
        }
    }
}

/// Geometry scaffolds selected by a (quantity, shape) keyword pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GeometryScaffold {
    CircleArea,
    TriangleArea,
}

const GEOMETRY_SCAFFOLDS: [(&str, &str, GeometryScaffold); 2] = [
    ("area", "circle", GeometryScaffold::CircleArea),
    ("area", "triangle", GeometryScaffold::TriangleArea),
];

/// Synthesizer for solution drafts
#[derive(Debug, Clone, Default)]
pub struct Synthesizer {
    options: SynthesisOptions,
}

impl Synthesizer {
    /// Create a new synthesizer
    pub fn new(options: SynthesisOptions) -> Self {
        Self { options }
    }

    /// Synthesize a draft, degrading to the apology draft on any failure
    pub fn synthesize(&self, question: &ClassifiedQuestion, exemplars: &[Exemplar]) -> SolutionDraft {
        match self.try_synthesize(question, exemplars) {
            Ok(draft) => draft,
            Err(e) => {
                warn!(error = %e, topic = %question.topic, "Synthesis failed, returning apology");
                SolutionDraft::apology()
            }
        }
    }

    /// Synthesize a draft, surfacing `AppError::Synthesis` on failure
    pub fn try_synthesize(
        &self,
        question: &ClassifiedQuestion,
        exemplars: &[Exemplar],
    ) -> Result<SolutionDraft> {
        let length = question.raw_text.chars().count();
        if length > self.options.max_question_chars {
            return Err(AppError::Synthesis {
                message: format!(
                    "question has {} characters, limit is {}",
                    length, self.options.max_question_chars
                ),
            });
        }

        let context = self.exemplar_block(exemplars);

        match question.topic {
            Topic::Algebra => self.solve_algebra(&question.raw_text, &context),
            Topic::Geometry => Ok(self.solve_geometry(&question.raw_text, &context)),
            Topic::Probability | Topic::Calculus | Topic::General => {
                Ok(self.solve_general(&question.raw_text, &context))
            }
        }
    }

    /// Render up to `max_exemplars` exemplars as worked context
    fn exemplar_block(&self, exemplars: &[Exemplar]) -> String {
        if exemplars.is_empty() || self.options.max_exemplars == 0 {
            return String::new();
        }

        let mut block = String::from("Similar solved examples:\n");
        for exemplar in exemplars.iter().take(self.options.max_exemplars) {
            block.push_str(&format!("Q: {}\nA: {}\n\n", exemplar.question, exemplar.answer));
        }
        block
    }

    fn solve_algebra(&self, question: &str, context: &str) -> Result<SolutionDraft> {
        let Some((equation, variable)) = extract_equation(question)?
            .and_then(|equation| equation_variable(&equation).map(|variable| (equation, variable)))
        else {
            return Ok(SolutionDraft {
                body: with_context(
                    "I can help you solve this algebra problem! Please provide the equation clearly, for example: '2x + 5 = 13'".to_string(),
                    context,
                ),
                steps: Vec::new(),
            });
        };

        let steps = vec![
            "Step 1: Isolate the variable term".to_string(),
            "Step 2: Perform arithmetic operations".to_string(),
            format!("Step 3: Find the value of {}", variable),
        ];

        let body = format!(
            "🔢 **Solving: {equation}**\n\n\
             **Step 1:** Isolate the variable term\n\
             **Step 2:** Perform arithmetic operations\n\
             **Step 3:** Find the value of {variable}\n\n\
             *Note: This is a simplified solution. For complex equations, please provide more details.*",
        );

        Ok(SolutionDraft {
            body: with_context(body, context),
            steps,
        })
    }

    fn solve_geometry(&self, question: &str, context: &str) -> SolutionDraft {
        let lowered = question.to_lowercase();
        let scaffold = GEOMETRY_SCAFFOLDS
            .iter()
            .find(|(quantity, shape, _)| lowered.contains(quantity) && lowered.contains(shape))
            .map(|(_, _, scaffold)| *scaffold);

        match scaffold {
            Some(GeometryScaffold::CircleArea) => {
                let radius = 7.0_f64;
                let area = std::f64::consts::PI * radius * radius;
                let steps = vec![
                    "1. Identify the radius (r)".to_string(),
                    "2. Square the radius (r²)".to_string(),
                    "3. Multiply by π (3.14159...)".to_string(),
                ];
                let body = format!(
                    "📐 **Circle Area Problem**\n\n\
                     **Formula:** Area = πr²\n\n\
                     **Steps:**\n{}\n\n\
                     **Example:** If radius = {radius}cm\n\
                     Area = π × {radius}² = π × {squared} = {area:.2} cm²",
                    steps.join("\n"),
                    squared = radius * radius,
                );
                SolutionDraft { body: with_context(body, context), steps }
            }
            Some(GeometryScaffold::TriangleArea) => {
                let (base, height) = (6.0_f64, 4.0_f64);
                let steps = vec![
                    "1. Identify the base and height".to_string(),
                    "2. Multiply base × height".to_string(),
                    "3. Divide by 2".to_string(),
                ];
                let body = format!(
                    "📐 **Triangle Area Problem**\n\n\
                     **Formula:** Area = ½ × base × height\n\n\
                     **Steps:**\n{}\n\n\
                     **Example:** If base = {base}cm and height = {height}cm\n\
                     Area = ½ × {base} × {height} = {area} cm²",
                    steps.join("\n"),
                    area = 0.5 * base * height,
                );
                SolutionDraft { body: with_context(body, context), steps }
            }
            None => SolutionDraft {
                body: with_context(
                    "I can help with geometry! Please specify what you need to find (area, volume, perimeter, etc.) and provide the measurements.".to_string(),
                    context,
                ),
                steps: Vec::new(),
            },
        }
    }

    fn solve_general(&self, question: &str, context: &str) -> SolutionDraft {
        let steps = vec![
            "1. Identify what is given".to_string(),
            "2. Determine what needs to be found".to_string(),
            "3. Choose the appropriate formula or method".to_string(),
            "4. Solve step by step".to_string(),
        ];
        let body = format!(
            "📚 **Math Problem Solution**\n\n\
             I understand you need help with: \"{}\"\n\n\
             **Approach:**\n{}\n\n\
             Please provide more specific details about the problem, including any numbers or measurements involved.",
            question.trim(),
            steps.join("\n"),
        );
        SolutionDraft { body: with_context(body, context), steps }
    }
}

fn with_context(mut body: String, context: &str) -> String {
    if !context.is_empty() {
        body.push_str("\n\n");
        body.push_str(context.trim_end());
    }
    body
}

/// Find the first equation-shaped run: operators and operands around an `=`
/// with something on each side and an x, y or z to solve for.
fn extract_equation(question: &str) -> Result<Option<String>> {
    let pattern = Regex::new(EQUATION_PATTERN).map_err(|e| AppError::Synthesis {
        message: format!("equation pattern failed to compile: {}", e),
    })?;

    let equation = pattern
        .find_iter(question)
        .map(|m| m.as_str().trim())
        .find(|candidate| {
            candidate.split_once('=').is_some_and(|(left, right)| {
                left.chars().any(|c| c.is_alphanumeric())
                    && right.chars().any(|c| c.is_alphanumeric())
            }) && equation_variable(candidate).is_some()
        })
        .map(str::to_string);

    Ok(equation)
}

/// The unknown an equation is solved for, lowercased
fn equation_variable(equation: &str) -> Option<char> {
    equation
        .chars()
        .find(|c| matches!(c, 'x' | 'y' | 'z' | 'X' | 'Y' | 'Z'))
        .map(|c| c.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::topic::classify;

    fn exemplar(question: &str, answer: &str) -> Exemplar {
        Exemplar {
            question: question.to_string(),
            answer: answer.to_string(),
            source: ExamSource::Waec,
            year: 2023,
            similarity: 0.9,
        }
    }

    #[test]
    fn test_extract_equation() {
        assert_eq!(extract_equation("2x + 5 = 13").unwrap().as_deref(), Some("2x + 5 = 13"));
        assert_eq!(extract_equation("Solve for x: 2x+5=13").unwrap().as_deref(), Some("2x+5=13"));
        assert_eq!(extract_equation("Factorize x² - 9").unwrap(), None);
        assert_eq!(extract_equation("what is = ?").unwrap(), None);
        assert_eq!(extract_equation("Is 2 + 3 = 5?").unwrap(), None);
        assert_eq!(extract_equation("3Y - 2 = 7").unwrap().as_deref(), Some("3Y - 2 = 7"));
        assert_eq!(equation_variable("3Y - 2 = 7"), Some('y'));
    }

    #[test]
    fn test_arithmetic_identity_asks_for_equation() {
        let draft = Synthesizer::default().solve_algebra("Is 2 + 3 = 5?", "").unwrap();

        assert!(draft.body.starts_with("I can help you solve this algebra problem!"));
        assert!(!draft.body.contains("Find the value of"));
        assert!(draft.steps.is_empty());
    }

    #[test]
    fn test_algebra_scaffold_echoes_equation() {
        let synthesizer = Synthesizer::default();
        let draft = synthesizer.synthesize(&classify("2x + 5 = 13"), &[]);

        assert!(draft.body.contains("**Solving: 2x + 5 = 13**"));
        assert!(draft.body.contains("**Step 1:** Isolate the variable term"));
        assert!(draft.body.contains("**Step 3:** Find the value of x"));
        assert_eq!(draft.steps.len(), 3);
    }

    #[test]
    fn test_algebra_without_equation_asks_for_clarification() {
        let synthesizer = Synthesizer::default();
        let exemplars = vec![exemplar("Factorize x² - 9", "(x + 3)(x - 3)")];
        let draft = synthesizer.synthesize(&classify("Factorize x² - 9 please"), &exemplars);

        assert!(draft.body.starts_with("I can help you solve this algebra problem!"));
        assert!(draft.body.contains("Q: Factorize x² - 9\nA: (x + 3)(x - 3)"));
        assert!(draft.steps.is_empty());
    }

    #[test]
    fn test_exemplars_capped() {
        let synthesizer = Synthesizer::default();
        let exemplars = vec![
            exemplar("first", "one"),
            exemplar("second", "two"),
            exemplar("third", "three"),
        ];
        let draft = synthesizer.synthesize(&classify("2x + 5 = 13"), &exemplars);

        assert!(draft.body.contains("Similar solved examples:"));
        assert!(draft.body.contains("Q: first"));
        assert!(draft.body.contains("Q: second"));
        assert!(!draft.body.contains("Q: third"));
    }

    #[test]
    fn test_circle_area_scaffold() {
        let synthesizer = Synthesizer::default();
        let draft = synthesizer.synthesize(&classify("Find the area of a circle with radius 7cm"), &[]);

        assert!(draft.body.contains("**Formula:** Area = πr²"));
        assert!(draft.body.contains("153.94 cm²"));
        assert_eq!(draft.steps.len(), 3);
    }

    #[test]
    fn test_triangle_area_scaffold() {
        let synthesizer = Synthesizer::default();
        let draft = synthesizer.synthesize(&classify("What is the area of this triangle?"), &[]);

        assert!(draft.body.contains("Area = ½ × base × height"));
        assert!(draft.body.contains("= 12 cm²"));
    }

    #[test]
    fn test_geometry_without_pair_asks_for_clarification() {
        let synthesizer = Synthesizer::default();
        let draft = synthesizer.synthesize(&classify("volume of a cone"), &[]);

        assert!(draft.body.starts_with("I can help with geometry!"));
        assert!(draft.steps.is_empty());
    }

    #[test]
    fn test_probability_and_calculus_use_general_scaffold() {
        let synthesizer = Synthesizer::default();
        for text in ["What is the probability of heads on a coin?", "Find the limit of 1/n"] {
            let draft = synthesizer.synthesize(&classify(text), &[]);
            assert!(draft.body.contains("**Math Problem Solution**"));
            assert!(draft.body.contains(&format!("I understand you need help with: \"{}\"", text)));
            assert_eq!(draft.steps.len(), 4);
        }
    }

    #[test]
    fn test_oversized_question_degrades_to_apology() {
        let synthesizer = Synthesizer::new(SynthesisOptions {
            max_exemplars: 2,
            max_question_chars: 10,
        });
        let question = classify("Solve for x: 2x+5=13");

        assert!(matches!(
            synthesizer.try_synthesize(&question, &[]),
            Err(AppError::Synthesis { .. })
        ));
        assert_eq!(synthesizer.synthesize(&question, &[]), SolutionDraft::apology());
    }
}
