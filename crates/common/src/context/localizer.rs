//! Scaffold localization
//!
//! Only the scaffold vocabulary is translated. Replacement is case-sensitive,
//! applied in a fixed order, and leaves the rest of the text (including the
//! user's own words and retrieved exemplars) untouched.

use super::language::Language;

impl Language {
    /// Ordered (English, local) replacements for scaffold vocabulary
    pub fn glossary(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Language::English => &[],
            Language::Hausa => &[
                ("Step", "Mataki"),
                ("Solution", "Mafita"),
                ("Formula", "Dabara"),
                ("Answer", "Amsa"),
            ],
            Language::Yoruba => &[
                ("Step", "Igbesẹ"),
                ("Solution", "Ojutu"),
                ("Formula", "Agbekalẹ"),
                ("Answer", "Idahun"),
            ],
            Language::Igbo => &[
                ("Step", "Nzọụkwụ"),
                ("Solution", "Azịza"),
                ("Formula", "Usoro"),
                ("Answer", "Azịza"),
            ],
        }
    }
}

/// Translate scaffold terms in `text` into `language`
pub fn localize(text: &str, language: Language) -> String {
    language
        .glossary()
        .iter()
        .fold(text.to_string(), |acc, (english, local)| acc.replace(english, local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_english_is_identity() {
        let text = "**Step 1:** Solution with Formula and Answer";
        assert_eq!(localize(text, Language::English), text);
    }

    #[test]
    fn test_hausa() {
        assert_eq!(
            localize("**Step 1:** Isolate the variable term", Language::Hausa),
            "**Mataki 1:** Isolate the variable term"
        );
        assert_eq!(localize("**Formula:** Area = πr²", Language::Hausa), "**Dabara:** Area = πr²");
    }

    #[test]
    fn test_every_occurrence_is_replaced() {
        let text = "**Step 1:** Isolate the variable term\n**Step 2:** Perform arithmetic operations\n**Step 3:** Find the value of x";
        let localized = localize(text, Language::Hausa);

        assert_eq!(localized.matches("Mataki").count(), 3);
        assert!(!localized.contains("Step"));
        assert!(localized.starts_with("**Mataki 1:** Isolate"));
        assert!(localized.ends_with("**Mataki 3:** Find the value of x"));
    }

    #[test]
    fn test_case_sensitive() {
        assert_eq!(localize("solve step by step", Language::Yoruba), "solve step by step");
        assert_eq!(localize("Step", Language::Yoruba), "Igbesẹ");
    }

    #[test]
    fn test_igbo_shares_solution_and_answer() {
        assert_eq!(localize("Solution Answer", Language::Igbo), "Azịza Azịza");
    }
}
