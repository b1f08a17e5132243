//! Context arbitration
//!
//! This module applies suppression and qualification rules to the raw match
//! set:
//! - Global veto: any `ignore_contexts` phrase anywhere in the entry voids
//!   every match (coarse disambiguation, e.g. "hurt myself laughing").
//! - Self-reference qualification: matches containing a trigger word are
//!   only valid if the entry also contains a first-person token.
//!
//! Both checks are entry-wide, not proximity-scoped to the match.

use crate::config::ContextRules;
use crate::types::{MatchSet, Severity};
use tracing::debug;

/// First-person tokens that satisfy self-reference qualification.
/// Contracted forms appear apostrophe-stripped, as the normalizer leaves them.
pub const FIRST_PERSON_TOKENS: [&str; 7] = ["i", "im", "ive", "me", "my", "mine", "myself"];

/// Arbiter that filters a raw match set against the context rules
pub struct ContextArbiter;

impl ContextArbiter {
    /// Filter raw matches for one entry. Returns an all-empty set when the
    /// global veto applies.
    ///
    /// `original` is the un-normalized entry text, used only for logging.
    pub fn filter(
        original: &str,
        normalized: &str,
        raw: &MatchSet,
        rules: &ContextRules,
    ) -> MatchSet {
        if raw.is_empty() {
            return MatchSet::default();
        }

        if let Some(context) = rules
            .ignore_contexts
            .iter()
            .find(|c| !c.is_empty() && normalized.contains(c.as_str()))
        {
            debug!(
                context = %context,
                entry = %original,
                "ignore context present, voiding all matches"
            );
            return MatchSet::default();
        }

        let has_self_reference = normalized
            .split(' ')
            .any(|token| FIRST_PERSON_TOKENS.contains(&token));

        let mut filtered = MatchSet::default();
        for severity in Severity::ALL {
            for phrase in raw.tier(severity) {
                if needs_self_reference(phrase, rules) && !has_self_reference {
                    debug!(phrase = %phrase, "match dropped, no first-person reference");
                    continue;
                }
                if !intent_qualified(phrase, normalized) {
                    continue;
                }
                filtered.tier_mut(severity).push(phrase.clone());
            }
        }
        filtered
    }
}

/// Whether a matched phrase carries any self-reference trigger word
fn needs_self_reference(phrase: &str, rules: &ContextRules) -> bool {
    rules
        .self_reference_required
        .iter()
        .any(|trigger| !trigger.is_empty() && phrase.contains(trigger.as_str()))
}

/// Intent qualification currently accepts every match. The hook stays in
/// the filter so proximity-based intent detection can slot in later without
/// reshaping the pipeline; the permissive behavior biases toward
/// over-flagging.
fn intent_qualified(_phrase: &str, _normalized: &str) -> bool {
    true
}
