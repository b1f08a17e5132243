//! Journal Sentinel - risk flagging and pattern escalation for student journals
//!
//! Sentinel scans free-text journal entries for concerning language through a
//! deterministic pipeline: normalization → tiered phrase matching → context
//! arbitration → severity resolution → flag assembly. Persisted flags then
//! feed a rolling-window pattern detector that escalates repeated concerns to
//! events for human follow-up.
//!
//! The engine is a rule-based classifier, not a statistical model: same
//! entry, same dictionary, same verdict.

pub mod config;
pub mod context;
pub mod dedup;
pub mod error;
pub mod export;
pub mod flag;
pub mod matcher;
pub mod normalizer;
pub mod pattern;
pub mod pipeline;
pub mod severity;
pub mod store;
pub mod types;

pub use config::{ContextRules, KeywordConfig};
pub use dedup::dedup_flags;
pub use error::{ScanError, StoreError};
pub use export::export_csv;
pub use pipeline::{classify_entry, Classification, RescanSummary, SentinelEngine};
pub use store::{MemoryStore, SentinelStore};
pub use types::{
    AuthorProfile, Event, EventType, Flag, FlagStatus, JournalEntry, MatchSet, Severity,
};

/// Engine version embedded in CLI output
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
