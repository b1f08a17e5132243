//! Severity resolution
//!
//! Reduces the filtered match set to a single verdict: strict red > amber >
//! yellow priority, plus one cross-tier escalation rule driven by the
//! `yellow.absolutes` sub-list.

use crate::config::KeywordConfig;
use crate::matcher::phrase_present;
use crate::types::{MatchSet, Severity};

/// Resolver reducing a filtered match set to one severity verdict
pub struct SeverityResolver;

impl SeverityResolver {
    /// Resolve the final verdict for one entry; `None` means no Flag.
    ///
    /// Escalation: when the base verdict is yellow, the entry contains an
    /// `absolutes` phrase, and the filtered set still holds amber matches,
    /// the verdict upgrades to amber. Red and amber base verdicts already
    /// dominate and are never upgraded.
    pub fn resolve(
        matches: &MatchSet,
        normalized: &str,
        config: &KeywordConfig,
    ) -> Option<Severity> {
        let base = if !matches.red.is_empty() {
            Some(Severity::Red)
        } else if !matches.amber.is_empty() {
            Some(Severity::Amber)
        } else if !matches.yellow.is_empty() {
            Some(Severity::Yellow)
        } else {
            None
        };

        // The two escalation inputs are evaluated independently of the
        // priority order above.
        let absolutes_present = config
            .absolutes()
            .iter()
            .any(|phrase| phrase_present(normalized, phrase));

        if base == Some(Severity::Yellow) && absolutes_present && !matches.amber.is_empty() {
            return Some(Severity::Amber);
        }

        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config_with_absolutes() -> KeywordConfig {
        KeywordConfig::from_json(
            r#"{
                "red": {"self_harm": ["hurt myself"]},
                "amber": {"hopelessness": ["hopeless"]},
                "yellow": {"absolutes": ["always"], "low_mood": ["sad"]}
            }"#,
        )
        .unwrap()
    }

    fn matches(red: &[&str], amber: &[&str], yellow: &[&str]) -> MatchSet {
        MatchSet {
            red: red.iter().map(|s| s.to_string()).collect(),
            amber: amber.iter().map(|s| s.to_string()).collect(),
            yellow: yellow.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn red_dominates_all_tiers() {
        let verdict = SeverityResolver::resolve(
            &matches(&["hurt myself"], &["hopeless"], &["sad"]),
            "text",
            &config_with_absolutes(),
        );
        assert_eq!(verdict, Some(Severity::Red));
    }

    #[test]
    fn amber_dominates_yellow() {
        let verdict = SeverityResolver::resolve(
            &matches(&[], &["hopeless"], &["sad"]),
            "text",
            &config_with_absolutes(),
        );
        assert_eq!(verdict, Some(Severity::Amber));
    }

    #[test]
    fn yellow_only_resolves_yellow() {
        let verdict = SeverityResolver::resolve(
            &matches(&[], &[], &["sad"]),
            "im always sad",
            &config_with_absolutes(),
        );
        assert_eq!(verdict, Some(Severity::Yellow));
    }

    #[test]
    fn empty_set_resolves_none() {
        let verdict =
            SeverityResolver::resolve(&MatchSet::default(), "fine", &config_with_absolutes());
        assert_eq!(verdict, None);
    }

    #[test]
    fn escalation_does_not_fire_from_an_amber_base() {
        // Amber base verdict already dominates; the upgrade must not change it
        let verdict = SeverityResolver::resolve(
            &matches(&[], &["hopeless"], &["sad"]),
            "im always hopeless and sad",
            &config_with_absolutes(),
        );
        assert_eq!(verdict, Some(Severity::Amber));
    }

    #[test]
    fn absolutes_alone_do_not_escalate_yellow() {
        // Absolutes phrase present, but no amber match to pair with
        let verdict = SeverityResolver::resolve(
            &matches(&[], &[], &["sad", "always"]),
            "im always sad",
            &config_with_absolutes(),
        );
        assert_eq!(verdict, Some(Severity::Yellow));
    }
}
