//! Answer pipeline stages
//!
//! The pure, stateless stages composed by the answer engine:
//! - Language detection over a closed marker lexicon
//! - Topic classification and difficulty estimation
//! - Topic-routed solution synthesis
//! - Confidence estimation
//! - Scaffold localization

mod confidence;
mod language;
mod localizer;
mod synthesizer;
mod topic;

pub use confidence::{estimate_confidence, ACTION_VERBS};
pub use language::{detect_language, Language};
pub use localizer::localize;
pub use synthesizer::{Exemplar, SolutionDraft, SynthesisOptions, Synthesizer};
pub use topic::{classify, classify_topic, estimate_difficulty, ClassifiedQuestion, Difficulty, Topic};
