//! Phrase matching
//!
//! This module scans normalized entry text against every phrase in every
//! severity tier, producing the raw per-tier match set. Suppression happens
//! later, in the context arbiter.

use crate::config::KeywordConfig;
use crate::types::{MatchSet, Severity};

/// Matcher producing the raw per-tier match set for one entry
pub struct Matcher;

impl Matcher {
    /// Scan normalized text against the full dictionary.
    ///
    /// Duplicate phrase strings are preserved when the same phrase appears
    /// in multiple categories of one tier. There is no cap on matches per
    /// entry.
    pub fn scan(normalized: &str, config: &KeywordConfig) -> MatchSet {
        let mut matches = MatchSet::default();
        for severity in Severity::ALL {
            let bucket = matches.tier_mut(severity);
            for phrase in config.phrases(severity) {
                if phrase_present(normalized, phrase) {
                    bucket.push(phrase.to_string());
                }
            }
        }
        matches
    }
}

/// Test whether a normalized phrase occurs in normalized text.
///
/// Single tokens use whole-word matching ("die" must not hit "died");
/// multi-word phrases use substring containment, which is intentionally
/// looser.
pub(crate) fn phrase_present(text: &str, phrase: &str) -> bool {
    if text.is_empty() || phrase.is_empty() {
        return false;
    }
    if phrase.contains(' ') {
        text.contains(phrase)
    } else {
        text.split(' ').any(|token| token == phrase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_config() -> KeywordConfig {
        KeywordConfig::from_json(
            r#"{
                "red": {"self_harm": ["hurt myself", "die"]},
                "amber": {"hopelessness": ["hopeless"], "mood": ["hopeless"]},
                "yellow": {"low_mood": ["sad"]}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn exact_phrase_is_matched_in_its_tier() {
        let matches = Matcher::scan("hurt myself", &test_config());
        assert_eq!(matches.red, ["hurt myself".to_string()]);
        assert!(matches.amber.is_empty());
        assert!(matches.yellow.is_empty());
    }

    #[test]
    fn single_words_require_whole_token() {
        let config = test_config();
        assert!(!Matcher::scan("my plant died today", &config)
            .red
            .contains(&"die".to_string()));
        assert!(Matcher::scan("i dont want to die", &config)
            .red
            .contains(&"die".to_string()));
        // "sad" must not fire inside "saddle"
        assert!(Matcher::scan("lost my saddle", &config).yellow.is_empty());
    }

    #[test]
    fn multi_word_phrases_use_containment() {
        let config = test_config();
        // Looser by design: containment ignores the surrounding tokens
        assert!(phrase_present("i hurt myselfish", "hurt myself"));
        assert!(phrase_present("really hurt myself badly", "hurt myself"));
        assert!(!phrase_present("hurt my self", "hurt myself"));
    }

    #[test]
    fn duplicate_phrases_across_categories_are_preserved() {
        let matches = Matcher::scan("everything feels hopeless", &test_config());
        assert_eq!(
            matches.amber,
            ["hopeless".to_string(), "hopeless".to_string()]
        );
    }

    #[test]
    fn empty_text_matches_nothing() {
        assert!(Matcher::scan("", &test_config()).is_empty());
    }

    #[test]
    fn empty_config_matches_nothing() {
        assert!(Matcher::scan("hurt myself", &KeywordConfig::empty()).is_empty());
    }
}
