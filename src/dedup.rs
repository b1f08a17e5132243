//! Read-time flag deduplication
//!
//! Retroactive re-scans can produce redundant Flags for the same logical
//! entry. This module collapses them at read time; it is a safety net, not
//! a creation-time constraint.
//!
//! Two flags describe the same logical entry when:
//! - both carry an external entry id and the (id, timestamp) pairs match, or
//! - they share a student, the same leading 50 characters of entry text,
//!   and timestamps within 60 seconds.

use crate::types::Flag;
use std::collections::HashMap;

/// Timestamp tolerance for the derived canonical key
pub const DEDUP_TOLERANCE_SECS: i64 = 60;

/// Entry-text prefix length used by the derived canonical key
pub const DEDUP_TEXT_PREFIX_CHARS: usize = 50;

/// Collapse a flag collection to one Flag per logical entry, keeping the
/// first-seen flag of each group. Input order is preserved.
pub fn dedup_flags(flags: &[Flag]) -> Vec<Flag> {
    let mut kept: Vec<Flag> = Vec::with_capacity(flags.len());
    let mut by_student: HashMap<String, Vec<usize>> = HashMap::new();

    for flag in flags {
        let indices = by_student.entry(flag.student_id.clone()).or_default();
        let duplicate = indices
            .iter()
            .any(|&i| same_logical_entry(&kept[i], flag));
        if duplicate {
            continue;
        }
        indices.push(kept.len());
        kept.push(flag.clone());
    }

    kept
}

fn same_logical_entry(a: &Flag, b: &Flag) -> bool {
    if let (Some(a_id), Some(b_id)) = (&a.entry_id, &b.entry_id) {
        return a_id == b_id && a.created_at == b.created_at;
    }
    a.student_id == b.student_id
        && text_key(&a.entry_text) == text_key(&b.entry_text)
        && (a.created_at - b.created_at).num_seconds().abs() <= DEDUP_TOLERANCE_SECS
}

fn text_key(text: &str) -> &str {
    match text.char_indices().nth(DEDUP_TEXT_PREFIX_CHARS) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlagStatus, MatchSet, Severity};
    use chrono::{DateTime, Duration, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn flag(student_id: &str, text: &str, at: DateTime<Utc>, entry_id: Option<&str>) -> Flag {
        Flag {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            student_name: None,
            anonymous: true,
            grade: String::new(),
            house: String::new(),
            created_at: at,
            entry_text: text.to_string(),
            matches: MatchSet::default(),
            severity: Severity::Yellow,
            status: FlagStatus::New,
            notes: String::new(),
            entry_id: entry_id.map(str::to_string),
        }
    }

    #[test]
    fn identical_flags_within_tolerance_collapse() {
        let now = Utc::now();
        let first = flag("a", "feeling very low today", now, None);
        let second = flag(
            "a",
            "feeling very low today",
            now + Duration::seconds(45),
            None,
        );
        let deduped = dedup_flags(&[first.clone(), second]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, first.id);
    }

    #[test]
    fn beyond_tolerance_both_survive() {
        let now = Utc::now();
        let deduped = dedup_flags(&[
            flag("a", "feeling very low today", now, None),
            flag("a", "feeling very low today", now + Duration::seconds(90), None),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn different_students_never_collapse() {
        let now = Utc::now();
        let deduped = dedup_flags(&[
            flag("a", "feeling very low today", now, None),
            flag("b", "feeling very low today", now, None),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn entry_id_key_takes_priority() {
        let now = Utc::now();
        // Same entry id and timestamp: duplicates even though texts differ
        let deduped = dedup_flags(&[
            flag("a", "original text", now, Some("e-1")),
            flag("a", "edited text", now, Some("e-1")),
        ]);
        assert_eq!(deduped.len(), 1);

        // Same id at different timestamps: distinct
        let deduped = dedup_flags(&[
            flag("a", "original text", now, Some("e-1")),
            flag("a", "original text", now + Duration::seconds(30), Some("e-1")),
        ]);
        assert_eq!(deduped.len(), 2);
    }

    #[test]
    fn prefix_comparison_uses_first_fifty_chars() {
        let now = Utc::now();
        let shared: String = "x".repeat(50);
        let a = flag("a", &format!("{shared} tail one"), now, None);
        let b = flag("a", &format!("{shared} tail two"), now, None);
        // Identical 50-char prefixes collapse despite differing tails
        assert_eq!(dedup_flags(&[a, b]).len(), 1);

        let c = flag("a", "short text", now, None);
        let d = flag("a", "short text but longer", now, None);
        // Full texts shorter than the prefix must differ to survive
        assert_eq!(dedup_flags(&[c, d]).len(), 2);
    }

    #[test]
    fn first_seen_flag_wins() {
        let now = Utc::now();
        let first = flag("a", "same entry", now, None);
        let second = flag("a", "same entry", now + Duration::seconds(10), None);
        let third = flag("a", "same entry", now + Duration::seconds(20), None);
        let deduped = dedup_flags(&[first.clone(), second, third]);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].id, first.id);
    }

    #[test]
    fn multibyte_prefix_slicing_is_safe() {
        let now = Utc::now();
        let text: String = "é".repeat(60);
        let deduped = dedup_flags(&[flag("a", &text, now, None)]);
        assert_eq!(deduped.len(), 1);
    }
}
