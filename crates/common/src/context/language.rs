//! Language Detector - lexicon-based detection over the supported languages
//!
//! Each local language has a closed set of marker words. Detection checks
//! substring containment in the lower-cased text and walks the languages in a
//! fixed priority order; the first one with any hit wins, regardless of how
//! many markers a later language matches.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Languages a question may be asked in
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Hausa,
    Yoruba,
    Igbo,
}

/// Detection priority. English is the fallback and carries no markers.
const DETECTION_ORDER: [Language; 3] = [Language::Hausa, Language::Yoruba, Language::Igbo];

impl Language {
    /// Marker words signalling this language
    pub fn markers(&self) -> &'static [&'static str] {
        match self {
            Language::English => &[],
            Language::Hausa => &["ina", "yaya", "wannan", "da", "shi", "ta"],
            Language::Yoruba => &["bawo", "nibo", "kini", "ati", "ni", "pe"],
            Language::Igbo => &["kedu", "gini", "na", "nke", "ya", "ka"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hausa => "hausa",
            Language::Yoruba => "yoruba",
            Language::Igbo => "igbo",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detect the language of a question
pub fn detect_language(text: &str) -> Language {
    let lowered = text.to_lowercase();

    DETECTION_ORDER
        .into_iter()
        .find(|language| language.markers().iter().any(|m| lowered.contains(m)))
        .unwrap_or(Language::English)
}
