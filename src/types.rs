//! Core types for the classification pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw match sets, persisted Flag and Event records, and the author
//! metadata attached to journal entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity tier of a concerning-language match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Red,
    Amber,
    Yellow,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Red => "red",
            Severity::Amber => "amber",
            Severity::Yellow => "yellow",
        }
    }

    /// All tiers in priority order (highest concern first)
    pub const ALL: [Severity; 3] = [Severity::Red, Severity::Amber, Severity::Yellow];
}

/// Matched phrases per severity tier for a single entry.
///
/// Transient: exists only while one entry is being classified, then travels
/// on the resulting Flag. Duplicate phrase strings are preserved when a
/// phrase appears in multiple categories of the same tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchSet {
    pub red: Vec<String>,
    pub amber: Vec<String>,
    pub yellow: Vec<String>,
}

impl MatchSet {
    pub fn is_empty(&self) -> bool {
        self.red.is_empty() && self.amber.is_empty() && self.yellow.is_empty()
    }

    pub fn tier(&self, severity: Severity) -> &[String] {
        match severity {
            Severity::Red => &self.red,
            Severity::Amber => &self.amber,
            Severity::Yellow => &self.yellow,
        }
    }

    pub fn tier_mut(&mut self, severity: Severity) -> &mut Vec<String> {
        match severity {
            Severity::Red => &mut self.red,
            Severity::Amber => &mut self.amber,
            Severity::Yellow => &mut self.yellow,
        }
    }
}

/// Review lifecycle of a Flag. The engine only ever creates flags as `New`;
/// later transitions belong to the human reviewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagStatus {
    New,
    Reviewed,
    Closed,
}

impl FlagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagStatus::New => "new",
            FlagStatus::Reviewed => "reviewed",
            FlagStatus::Closed => "closed",
        }
    }
}

/// Persisted record asserting that one journal entry matched concerning
/// language at a given severity.
///
/// Serialized with camelCase field names, which is the shape the review UI
/// and export surface consume.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub id: Uuid,
    pub student_id: String,
    /// Display name; `None` when the entry was authored in anonymity mode
    pub student_name: Option<String>,
    pub anonymous: bool,
    /// Leading digit run of the author's class label, empty when absent
    pub grade: String,
    pub house: String,
    /// Timestamp of the underlying journal entry
    pub created_at: DateTime<Utc>,
    /// Entry text, verbatim
    pub entry_text: String,
    pub matches: MatchSet,
    pub severity: Severity,
    pub status: FlagStatus,
    pub notes: String,
    /// External journal-entry identifier, when the caller knows it.
    /// Used as the primary dedup key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<String>,
}

/// Detected behavioral pattern type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    #[serde(rename = "amberPattern")]
    AmberPattern,
    #[serde(rename = "yellowPattern")]
    YellowPattern,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::AmberPattern => "amberPattern",
            EventType::YellowPattern => "yellowPattern",
        }
    }
}

/// Persisted record asserting that a subject crossed a frequency threshold
/// of same-severity Flags within a rolling window. Created once, never
/// mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub student_id: String,
    /// Detection time; the window this event closes ends here
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: EventType,
    /// Number of qualifying flags inside the window at detection time
    pub count: u32,
    pub window_days: i64,
}

impl Event {
    pub fn new(student_id: &str, kind: EventType, count: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id: student_id.to_string(),
            created_at,
            kind,
            count,
            window_days: crate::pattern::WINDOW_DAYS,
        }
    }
}

/// Author metadata supplied by the journaling layer with each entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub id: String,
    pub first_name: String,
    pub surname: String,
    /// Class label, e.g. "10B"; its leading digits become the flag's grade
    #[serde(rename = "class")]
    pub class_label: String,
    pub house: String,
}

impl AuthorProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.surname)
    }
}

/// One journal entry as presented to the engine for (re)scanning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    /// External entry identifier, if the journaling layer assigns one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub student: AuthorProfile,
    pub text: String,
    #[serde(default)]
    pub anonymous: bool,
    pub written_at: DateTime<Utc>,
}
