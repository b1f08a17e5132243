//! Flag assembly
//!
//! Builds the persistable Flag record from a severity verdict, the entry,
//! and author metadata, honoring anonymity mode.

use crate::types::{AuthorProfile, Flag, FlagStatus, MatchSet, Severity};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Builder assembling Flag records
pub struct FlagBuilder;

impl FlagBuilder {
    /// Assemble a Flag. Callers only reach this with a non-`none` verdict;
    /// zero-match entries never produce a Flag.
    ///
    /// Each Flag gets a fresh id, never derived from content: two flags for
    /// textually identical entries remain distinct records.
    pub fn build(
        entry_text: &str,
        severity: Severity,
        matches: MatchSet,
        author: &AuthorProfile,
        anonymous: bool,
        entry_id: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Flag {
        Flag {
            id: Uuid::new_v4(),
            student_id: author.id.clone(),
            student_name: if anonymous {
                None
            } else {
                Some(author.full_name())
            },
            anonymous,
            grade: grade_from_class(&author.class_label),
            house: author.house.clone(),
            created_at,
            entry_text: entry_text.to_string(),
            matches,
            severity,
            status: FlagStatus::New,
            notes: String::new(),
            entry_id: entry_id.map(str::to_string),
        }
    }
}

/// Extract the leading digit run of a class label ("10B" -> "10");
/// empty when the label has no leading digits.
pub(crate) fn grade_from_class(class_label: &str) -> String {
    class_label
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect()
}
