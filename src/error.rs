//! Error types for Journal Sentinel

use crate::types::Flag;
use thiserror::Error;

/// Errors surfaced by the persistence boundary
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend unavailable: {0}")]
    Unavailable(String),

    #[error("snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur while classifying entries or detecting patterns
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid keyword config: {0}")]
    Config(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The Flag was built but could not be written. It is carried here so
    /// the caller can retry the write without re-running classification.
    #[error("failed to persist flag {}: {source}", .flag.id)]
    FlagPersist {
        flag: Box<Flag>,
        #[source]
        source: StoreError,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("export error: {0}")]
    Export(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
