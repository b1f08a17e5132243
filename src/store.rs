//! Persistence boundary
//!
//! Flags and Events are owned by an external store; the engine only talks
//! to it through the [`SentinelStore`] trait. The one non-negotiable
//! contract is [`SentinelStore::insert_event_if_window_clear`]: the
//! open-window check and the insert must be a single atomic step, so two
//! near-simultaneous detections for the same subject cannot both emit an
//! Event inside one window.
//!
//! [`MemoryStore`] is the in-process implementation, with JSON snapshots
//! for durability between runs.

use crate::error::StoreError;
use crate::types::{Event, Flag};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Flag/Event persistence operations required by the engine
pub trait SentinelStore: Send + Sync {
    fn insert_flag(&self, flag: &Flag) -> Result<(), StoreError>;

    fn flags_for_student(&self, student_id: &str) -> Result<Vec<Flag>, StoreError>;

    fn all_flags(&self) -> Result<Vec<Flag>, StoreError>;

    /// Insert the event only if no event of the same type for the same
    /// subject has an open window at `event.created_at`. Returns whether
    /// the event was inserted.
    ///
    /// Implementations must make the check and the insert atomic.
    fn insert_event_if_window_clear(&self, event: &Event) -> Result<bool, StoreError>;

    fn events_for_student(&self, student_id: &str) -> Result<Vec<Event>, StoreError>;

    fn all_events(&self) -> Result<Vec<Event>, StoreError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreInner {
    flags: Vec<Flag>,
    events: Vec<Event>,
}

/// In-memory store with atomic event check-and-insert.
///
/// All state sits behind one mutex, so the window check and insert in
/// [`SentinelStore::insert_event_if_window_clear`] form a single critical
/// section.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreInner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Restore a store from a JSON snapshot
    pub fn from_json(json: &str) -> Result<Self, StoreError> {
        let inner: StoreInner = serde_json::from_str(json)?;
        Ok(Self {
            inner: Mutex::new(inner),
        })
    }

    /// Serialize the full store to a JSON snapshot
    pub fn to_json(&self) -> Result<String, StoreError> {
        let inner = self.lock()?;
        Ok(serde_json::to_string_pretty(&*inner)?)
    }

    /// Load a snapshot file, starting empty when the file does not exist
    pub fn load(path: &std::path::Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write the store to a snapshot file
    pub fn save(&self, path: &std::path::Path) -> Result<(), StoreError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

impl SentinelStore for MemoryStore {
    fn insert_flag(&self, flag: &Flag) -> Result<(), StoreError> {
        self.lock()?.flags.push(flag.clone());
        Ok(())
    }

    fn flags_for_student(&self, student_id: &str) -> Result<Vec<Flag>, StoreError> {
        Ok(self
            .lock()?
            .flags
            .iter()
            .filter(|f| f.student_id == student_id)
            .cloned()
            .collect())
    }

    fn all_flags(&self) -> Result<Vec<Flag>, StoreError> {
        Ok(self.lock()?.flags.clone())
    }

    fn insert_event_if_window_clear(&self, event: &Event) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let window_open = inner.events.iter().any(|existing| {
            existing.student_id == event.student_id
                && existing.kind == event.kind
                && window_contains(existing, event)
        });
        if window_open {
            return Ok(false);
        }
        inner.events.push(event.clone());
        Ok(true)
    }

    fn events_for_student(&self, student_id: &str) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .lock()?
            .events
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    fn all_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.lock()?.events.clone())
    }
}

/// Whether `candidate.created_at` falls inside `existing`'s still-open window
fn window_contains(existing: &Event, candidate: &Event) -> bool {
    candidate.created_at >= existing.created_at
        && candidate.created_at < existing.created_at + Duration::days(existing.window_days)
}
