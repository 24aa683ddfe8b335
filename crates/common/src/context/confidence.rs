//! Confidence estimation from retrieval similarity and question wording

/// Verbs that mark a well-posed question
pub const ACTION_VERBS: [&str; 3] = ["solve", "find", "calculate"];

const BASE_CONFIDENCE: f32 = 0.5;
const SIMILARITY_WEIGHT: f32 = 0.3;
const ACTION_VERB_BONUS: f32 = 0.1;

/// Estimate answer confidence in [0.5, 1.0].
///
/// The mean neighbor similarity is clamped to [0, 1] before weighting, so
/// negative cosine scores never pull the estimate below the base.
pub fn estimate_confidence(question: &str, neighbor_scores: &[f32]) -> f32 {
    let mut confidence = BASE_CONFIDENCE;

    if !neighbor_scores.is_empty() {
        let mean = neighbor_scores.iter().sum::<f32>() / neighbor_scores.len() as f32;
        if mean.is_finite() {
            confidence += mean.clamp(0.0, 1.0) * SIMILARITY_WEIGHT;
        }
    }

    let lowered = question.to_lowercase();
    if ACTION_VERBS.iter().any(|verb| lowered.contains(verb)) {
        confidence += ACTION_VERB_BONUS;
    }

    confidence.min(1.0)
}
