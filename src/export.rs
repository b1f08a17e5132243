//! CSV export
//!
//! Flattens the deduplicated Flag collection for reporting: one row per
//! Flag, tier matches pipe-joined, quoting handled by the csv writer. A
//! reporting concern layered on top of the engine; classification behavior
//! is unaffected.

use crate::dedup::dedup_flags;
use crate::error::ScanError;
use crate::types::Flag;

const HEADER: [&str; 11] = [
    "createdAt",
    "severity",
    "status",
    "grade",
    "house",
    "anonymous",
    "studentName",
    "redMatches",
    "amberMatches",
    "yellowMatches",
    "entryText",
];

/// Render the given flags as CSV, deduplicating first
pub fn export_csv(flags: &[Flag]) -> Result<String, ScanError> {
    let deduped = dedup_flags(flags);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for flag in &deduped {
        writer.write_record([
            flag.created_at.to_rfc3339(),
            flag.severity.as_str().to_string(),
            flag.status.as_str().to_string(),
            flag.grade.clone(),
            flag.house.clone(),
            flag.anonymous.to_string(),
            flag.student_name.clone().unwrap_or_default(),
            flag.matches.red.join("|"),
            flag.matches.amber.join("|"),
            flag.matches.yellow.join("|"),
            flag.entry_text.clone(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ScanError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ScanError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FlagStatus, MatchSet, Severity};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    fn sample_flag(text: &str) -> Flag {
        Flag {
            id: Uuid::new_v4(),
            student_id: "s-1".to_string(),
            student_name: Some("Rowan Park".to_string()),
            anonymous: false,
            grade: "10".to_string(),
            house: "Kestrel".to_string(),
            created_at: Utc::now(),
            entry_text: text.to_string(),
            matches: MatchSet {
                red: vec!["hurt myself".to_string()],
                amber: vec!["hopeless".to_string(), "no point".to_string()],
                yellow: vec![],
            },
            severity: Severity::Red,
            status: FlagStatus::New,
            notes: String::new(),
            entry_id: None,
        }
    }

    #[test]
    fn one_row_per_flag_plus_header() {
        let csv = export_csv(&[sample_flag("entry one"), sample_flag("entry two")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("createdAt,severity,status"));
        assert!(lines[1].contains("red,new,10,Kestrel,false,Rowan Park"));
        assert!(lines[1].contains("hopeless|no point"));
    }

    #[test]
    fn entry_text_with_commas_and_quotes_is_escaped() {
        let csv = export_csv(&[sample_flag("said \"no, thanks\" today")]).unwrap();
        assert!(csv.contains("\"said \"\"no, thanks\"\" today\""));
    }

    #[test]
    fn export_deduplicates_before_rendering() {
        let mut dup = sample_flag("same entry");
        dup.created_at = dup.created_at + Duration::seconds(30);
        let csv = export_csv(&[sample_flag("same entry"), dup]).unwrap();
        assert_eq!(csv.lines().count(), 2);
    }

    #[test]
    fn anonymous_flag_exports_empty_name() {
        let mut flag = sample_flag("entry");
        flag.anonymous = true;
        flag.student_name = None;
        let csv = export_csv(&[flag]).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains(",true,,"));
    }
}
