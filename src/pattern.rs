//! Pattern detection
//!
//! Inspects a subject's prior Flags within a rolling 7-day window ending at
//! detection time and emits at most one Event per pattern type per
//! qualifying window. Red flags never pattern: each one is already
//! maximally urgent on its own.

use crate::error::ScanError;
use crate::store::SentinelStore;
use crate::types::{Event, EventType, Severity};
use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

/// Rolling window length in days
pub const WINDOW_DAYS: i64 = 7;

/// Amber flags inside the window needed to emit an `amberPattern` event
pub const AMBER_PATTERN_THRESHOLD: usize = 3;

/// Yellow flags inside the window needed to emit a `yellowPattern` event
pub const YELLOW_PATTERN_THRESHOLD: usize = 5;

/// Detector for frequency-based escalation patterns
pub struct PatternDetector;

impl PatternDetector {
    /// Run detection for a subject after one of their flags was persisted.
    /// The window ends now, at detection time.
    pub fn detect<S: SentinelStore + ?Sized>(
        store: &S,
        student_id: &str,
        severity: Severity,
    ) -> Result<Option<Event>, ScanError> {
        Self::detect_at(store, student_id, severity, Utc::now())
    }

    /// Detection with an explicit "now", for deterministic callers.
    ///
    /// A failed read of prior flags fails closed: no Event is created from
    /// a partial view, the condition is logged, and `Ok(None)` is returned.
    /// A failed Event insert is a write failure and is propagated.
    pub fn detect_at<S: SentinelStore + ?Sized>(
        store: &S,
        student_id: &str,
        severity: Severity,
        now: DateTime<Utc>,
    ) -> Result<Option<Event>, ScanError> {
        let (threshold, kind) = match severity {
            Severity::Amber => (AMBER_PATTERN_THRESHOLD, EventType::AmberPattern),
            Severity::Yellow => (YELLOW_PATTERN_THRESHOLD, EventType::YellowPattern),
            Severity::Red => return Ok(None),
        };

        let flags = match store.flags_for_student(student_id) {
            Ok(flags) => flags,
            Err(err) => {
                warn!(
                    student_id,
                    error = %err,
                    "could not load prior flags, skipping pattern detection"
                );
                return Ok(None);
            }
        };

        let window_start = now - Duration::days(WINDOW_DAYS);
        let count = flags
            .iter()
            .filter(|f| {
                f.severity == severity && f.created_at >= window_start && f.created_at <= now
            })
            .count();

        if count < threshold {
            return Ok(None);
        }

        let event = Event::new(student_id, kind, count as u32, now);
        if store.insert_event_if_window_clear(&event)? {
            info!(
                student_id,
                kind = kind.as_str(),
                count,
                "pattern event created"
            );
            Ok(Some(event))
        } else {
            // An earlier event's window is still open for this subject
            Ok(None)
        }
    }
}
