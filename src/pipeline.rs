//! Pipeline orchestration
//!
//! This module provides the public API of the engine. Classification of a
//! single entry is a pure function of the text and the keyword config;
//! [`SentinelEngine`] adds persistence and pattern detection on top.

use crate::config::KeywordConfig;
use crate::context::ContextArbiter;
use crate::error::ScanError;
use crate::flag::FlagBuilder;
use crate::matcher::Matcher;
use crate::normalizer::Normalizer;
use crate::pattern::PatternDetector;
use crate::severity::SeverityResolver;
use crate::store::SentinelStore;
use crate::types::{AuthorProfile, Event, Flag, JournalEntry, MatchSet, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Result of classifying one entry: the final verdict and the filtered
/// matches that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    pub severity: Severity,
    pub matches: MatchSet,
}

/// Classify one entry's text against a keyword config.
///
/// Pipeline stages:
/// 1. Normalizer - canonicalize the raw text
/// 2. Matcher - raw per-tier phrase scan
/// 3. ContextArbiter - global veto and self-reference qualification
/// 4. SeverityResolver - priority reduction plus the escalation rule
///
/// Returns `None` when no qualified match survives; zero-match entries
/// never produce a Flag.
pub fn classify_entry(text: &str, config: &KeywordConfig) -> Option<Classification> {
    let normalized = Normalizer::normalize(text);
    if normalized.is_empty() {
        return None;
    }

    let raw = Matcher::scan(&normalized, config);
    let filtered = ContextArbiter::filter(text, &normalized, &raw, &config.context_rules);
    let severity = SeverityResolver::resolve(&filtered, &normalized, config)?;

    Some(Classification {
        severity,
        matches: filtered,
    })
}

/// Outcome of a retroactive scan over historical entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RescanSummary {
    /// Entries examined
    pub scanned: usize,
    /// New flags created
    pub flagged: usize,
    /// Entries skipped because an equivalent flag already existed
    pub skipped: usize,
    /// Pattern events emitted while rescanning
    pub events: usize,
}

/// The flagging engine: cached keyword config plus a persistence boundary.
///
/// Classification itself is stateless and safe to run concurrently across
/// entries; same-subject event emission is serialized by the store's atomic
/// check-and-insert.
pub struct SentinelEngine<S: SentinelStore> {
    config: KeywordConfig,
    store: S,
}

impl<S: SentinelStore> SentinelEngine<S> {
    pub fn new(config: KeywordConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Engine with the dictionary shipped in the crate
    pub fn with_builtin_config(store: S) -> Self {
        Self::new(KeywordConfig::builtin(), store)
    }

    pub fn config(&self) -> &KeywordConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the cached config. This is the only invalidation path; the
    /// config never reloads implicitly.
    pub fn reload_config(&mut self, config: KeywordConfig) {
        info!(phrases = config.phrase_count(), "keyword config reloaded");
        self.config = config;
    }

    /// Classify one entry and persist the resulting Flag, if any.
    ///
    /// When the store write fails the built Flag travels inside
    /// [`ScanError::FlagPersist`], so the caller can retry the write
    /// without re-running classification.
    pub fn classify_and_flag(
        &self,
        entry_text: &str,
        author: &AuthorProfile,
        anonymous: bool,
        entry_id: Option<&str>,
        entry_timestamp: Option<DateTime<Utc>>,
    ) -> Result<Option<Flag>, ScanError> {
        let Some(classification) = classify_entry(entry_text, &self.config) else {
            debug!(student_id = %author.id, "entry produced no qualified matches");
            return Ok(None);
        };

        let created_at = entry_timestamp.unwrap_or_else(Utc::now);
        let flag = FlagBuilder::build(
            entry_text,
            classification.severity,
            classification.matches,
            author,
            anonymous,
            entry_id,
            created_at,
        );

        if let Err(source) = self.store.insert_flag(&flag) {
            return Err(ScanError::FlagPersist {
                flag: Box::new(flag),
                source,
            });
        }

        info!(
            flag_id = %flag.id,
            student_id = %flag.student_id,
            severity = flag.severity.as_str(),
            "flag created"
        );
        Ok(Some(flag))
    }

    /// Run pattern detection for a subject after one of their flags was
    /// persisted
    pub fn detect_patterns(
        &self,
        student_id: &str,
        severity: Severity,
    ) -> Result<Option<Event>, ScanError> {
        PatternDetector::detect(&self.store, student_id, severity)
    }

    /// Pattern detection with an explicit detection time
    pub fn detect_patterns_at(
        &self,
        student_id: &str,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, ScanError> {
        PatternDetector::detect_at(&self.store, student_id, severity, now)
    }

    /// Classify, flag, and detect patterns for one submitted entry
    pub fn process(&self, entry: &JournalEntry) -> Result<(Option<Flag>, Option<Event>), ScanError> {
        let flag = self.classify_and_flag(
            &entry.text,
            &entry.student,
            entry.anonymous,
            entry.id.as_deref(),
            Some(entry.written_at),
        )?;
        let event = match &flag {
            Some(flag) => self.detect_patterns(&flag.student_id, flag.severity)?,
            None => None,
        };
        Ok((flag, event))
    }

    /// Retroactively scan historical entries.
    ///
    /// An entry is skipped when the subject already has a flag with the
    /// same text and a timestamp within 60 seconds, so re-running the scan
    /// does not duplicate flags. The read-time deduplicator remains as the
    /// safety net behind this check.
    pub fn rescan(&self, entries: &[JournalEntry]) -> Result<RescanSummary, ScanError> {
        let mut summary = RescanSummary::default();

        for entry in entries {
            summary.scanned += 1;

            let existing = self.store.flags_for_student(&entry.student.id)?;
            let already_flagged = existing.iter().any(|flag| {
                flag.entry_text == entry.text
                    && (flag.created_at - entry.written_at).num_seconds().abs()
                        <= crate::dedup::DEDUP_TOLERANCE_SECS
            });
            if already_flagged {
                summary.skipped += 1;
                continue;
            }

            let (flag, event) = self.process(entry)?;
            if flag.is_some() {
                summary.flagged += 1;
            }
            if event.is_some() {
                summary.events += 1;
            }
        }

        info!(
            scanned = summary.scanned,
            flagged = summary.flagged,
            skipped = summary.skipped,
            events = summary.events,
            "retroactive rescan complete"
        );
        Ok(summary)
    }
}
