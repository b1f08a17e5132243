//! Keyword configuration
//!
//! This module loads the severity-tiered phrase dictionary and context rules.
//! The config is loaded once, phrases are pre-normalized, and the result is
//! immutable for the process lifetime; hot reload happens only through
//! [`crate::pipeline::SentinelEngine::reload_config`].
//!
//! A malformed or missing config fails closed: callers that use the
//! fail-soft loaders get an empty dictionary, so classification degrades to
//! "no flags produced" rather than blocking entry submission.

use crate::error::ScanError;
use crate::normalizer::Normalizer;
use crate::types::Severity;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Name of the yellow sub-category holding categorical/extreme language,
/// consulted by the cross-tier escalation rule.
pub const ABSOLUTES_CATEGORY: &str = "absolutes";

/// Suppression and qualification rules applied after raw matching
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextRules {
    /// Phrases that, if present anywhere in an entry, void all matches
    #[serde(default)]
    pub ignore_contexts: Vec<String>,
    /// Trigger words whose matches also require a first-person token
    #[serde(default)]
    pub self_reference_required: Vec<String>,
}

/// Severity-tiered phrase dictionary plus context rules.
///
/// Each tier maps category name to an ordered phrase list. Phrases are
/// stored in normalized form so per-entry matching never re-normalizes
/// dictionary entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeywordConfig {
    #[serde(default)]
    pub red: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub amber: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub yellow: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub context_rules: ContextRules,
}

impl KeywordConfig {
    /// An empty dictionary: matches nothing, flags nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a config from its JSON shape, normalizing every phrase
    pub fn from_json(json: &str) -> Result<Self, ScanError> {
        let mut config: KeywordConfig =
            serde_json::from_str(json).map_err(|e| ScanError::Config(e.to_string()))?;
        config.normalize_phrases();
        Ok(config)
    }

    /// Load a config file, propagating read/parse failures
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load a config file, failing closed to the empty dictionary on any
    /// read or parse error
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "keyword config unusable, falling back to empty dictionary"
                );
                Self::empty()
            }
        }
    }

    /// The dictionary shipped with the engine, used until a school loads
    /// its own. Falls back to the empty dictionary if the embedded asset
    /// is ever unparseable.
    pub fn builtin() -> Self {
        match Self::from_json(include_str!("../config/keywords.json")) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "embedded keyword dictionary unusable");
                Self::empty()
            }
        }
    }

    /// Category map for one severity tier
    pub fn tier(&self, severity: Severity) -> &BTreeMap<String, Vec<String>> {
        match severity {
            Severity::Red => &self.red,
            Severity::Amber => &self.amber,
            Severity::Yellow => &self.yellow,
        }
    }

    /// Iterate every phrase in a tier, across all its categories
    pub fn phrases(&self, severity: Severity) -> impl Iterator<Item = &str> {
        self.tier(severity)
            .values()
            .flat_map(|phrases| phrases.iter().map(String::as_str))
    }

    /// Phrases in the `yellow.absolutes` escalation sub-list
    pub fn absolutes(&self) -> &[String] {
        self.yellow
            .get(ABSOLUTES_CATEGORY)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.amber.is_empty() && self.yellow.is_empty()
    }

    /// Total phrase count across all tiers
    pub fn phrase_count(&self) -> usize {
        Severity::ALL
            .iter()
            .map(|s| self.phrases(*s).count())
            .sum()
    }

    fn normalize_phrases(&mut self) {
        for tier in [&mut self.red, &mut self.amber, &mut self.yellow] {
            for phrases in tier.values_mut() {
                for phrase in phrases.iter_mut() {
                    *phrase = Normalizer::normalize(phrase);
                }
                phrases.retain(|p| !p.is_empty());
            }
        }
        for phrase in self.context_rules.ignore_contexts.iter_mut() {
            *phrase = Normalizer::normalize(phrase);
        }
        for word in self.context_rules.self_reference_required.iter_mut() {
            *word = Normalizer::normalize(word);
        }
    }
}
