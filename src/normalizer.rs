//! Entry text normalization
//!
//! This module canonicalizes raw journal text into the form the matcher
//! works on:
//! - Lower-cased
//! - Apostrophes stripped, so contracted forms match their expanded
//!   dictionary entries ("can't" and "cant" become identical)
//! - All other punctuation replaced by a single space
//! - Whitespace collapsed and trimmed
//!
//! No locale awareness, no stemming.

/// Normalizer for converting raw entry text to matchable text
pub struct Normalizer;

impl Normalizer {
    /// Normalize raw entry text. Idempotent; empty input yields an empty
    /// string, which matches nothing downstream.
    pub fn normalize(raw: &str) -> String {
        let mut out = String::with_capacity(raw.len());
        for ch in raw.chars() {
            match ch {
                '\'' | '\u{2019}' => {}
                c if c.is_alphanumeric() => {
                    for lower in c.to_lowercase() {
                        out.push(lower);
                    }
                }
                _ => {
                    if !out.is_empty() && !out.ends_with(' ') {
                        out.push(' ');
                    }
                }
            }
        }
        if out.ends_with(' ') {
            out.pop();
        }
        out
    }

    /// Normalize optional text; absent text is treated as empty
    pub fn normalize_opt(raw: Option<&str>) -> String {
        raw.map(Self::normalize).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lowercases_and_strips_punctuation() {
        assert_eq!(
            Normalizer::normalize("I want to HURT myself!!"),
            "i want to hurt myself"
        );
    }

    #[test]
    fn apostrophes_collapse_contractions() {
        assert_eq!(Normalizer::normalize("can't"), "cant");
        assert_eq!(Normalizer::normalize("I\u{2019}m fine"), "im fine");
        // Contracted and expanded forms normalize identically
        assert_eq!(
            Normalizer::normalize("cant"),
            Normalizer::normalize("can't")
        );
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(
            Normalizer::normalize("  so...   tired,  today \n"),
            "so tired today"
        );
    }

    #[test]
    fn empty_and_absent_input() {
        assert_eq!(Normalizer::normalize(""), "");
        assert_eq!(Normalizer::normalize("?!..."), "");
        assert_eq!(Normalizer::normalize_opt(None), "");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "I can't cope... at ALL",
            "what's  the   point?",
            "",
            "plain words",
            "école déjà-vu", // non-ASCII survives lowercasing
        ];
        for raw in samples {
            let once = Normalizer::normalize(raw);
            assert_eq!(Normalizer::normalize(&once), once, "input: {raw:?}");
        }
    }
}
