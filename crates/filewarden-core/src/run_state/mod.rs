//! Durable state of the bulk checking run.
//!
//! Only one [`CheckingRun`] exists at a time. It is stored under a single
//! well-known key so that a slice started by one process can be resumed by
//! the next.

mod json;
mod sqlite;

pub use json::JsonRunStateStore;
pub use sqlite::SqliteRunStateStore;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};

/// Lifecycle of a checking run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    Requested,
    InProgress,
    Finished,
    Cancelled,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Idle => "idle",
            RunStatus::Requested => "requested",
            RunStatus::InProgress => "in_progress",
            RunStatus::Finished => "finished",
            RunStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of the bulk checking run.
///
/// Invariants: `checked_count <= total_to_check` and
/// `missing_count <= checked_count`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckingRun {
    pub status: RunStatus,
    /// Id of the last processed record; 0 before the first one.
    pub cursor: i64,
    /// Highest record id enrolled when the run was requested.
    pub enrolled_upper_id: i64,
    pub total_to_check: u64,
    pub checked_count: u64,
    pub missing_count: u64,
    /// Records processed by the most recent slice only.
    pub just_checked_count: u64,
    pub requested_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CheckingRun {
    /// A freshly requested run over records `1..=enrolled_upper_id`.
    pub fn requested(enrolled_upper_id: i64, total_to_check: u64) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            status: RunStatus::Requested,
            enrolled_upper_id,
            total_to_check,
            requested_at: Some(now.clone()),
            updated_at: Some(now),
            ..Default::default()
        }
    }

    /// Requested or in progress: `start` refuses and `execute` does work.
    pub fn is_active(&self) -> bool {
        matches!(self.status, RunStatus::Requested | RunStatus::InProgress)
    }

    pub fn is_finished(&self) -> bool {
        self.status == RunStatus::Finished
    }

    /// Account for one visited record and move the cursor past it.
    pub(crate) fn record_checked(&mut self, id: i64, missing: bool) {
        self.cursor = self.cursor.max(id);
        self.just_checked_count += 1;
        if self.checked_count < self.total_to_check {
            self.checked_count += 1;
            if missing {
                self.missing_count = (self.missing_count + 1).min(self.checked_count);
            }
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Some(chrono::Utc::now().to_rfc3339());
    }

    /// Percentage of enrolled records checked so far.
    pub fn progress_percent(&self) -> f64 {
        if self.total_to_check == 0 {
            return 100.0;
        }
        self.checked_count as f64 * 100.0 / self.total_to_check as f64
    }
}

/// Load/save access to the single persisted run.
pub trait RunStateStore: Send + Sync {
    /// Read the stored run, `None` if nothing was ever saved.
    fn load(&self) -> Result<Option<CheckingRun>>;

    /// Replace the stored run.
    fn save(&self, run: &CheckingRun) -> Result<()>;

    /// Current snapshot; an unsaved store reads as an idle run.
    fn get_status(&self) -> Result<CheckingRun> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Clear the run back to idle.
    fn reset(&self) -> Result<()> {
        self.save(&CheckingRun::default())
    }
}

impl<T: RunStateStore + ?Sized> RunStateStore for Arc<T> {
    fn load(&self) -> Result<Option<CheckingRun>> {
        (**self).load()
    }

    fn save(&self, run: &CheckingRun) -> Result<()> {
        (**self).save(run)
    }
}

/// Process-local store, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryRunStateStore {
    run: Mutex<Option<CheckingRun>>,
}

impl MemoryRunStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStateStore for MemoryRunStateStore {
    fn load(&self) -> Result<Option<CheckingRun>> {
        let guard = self
            .run
            .lock()
            .map_err(|_| crate::WardenError::Other("run state lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, run: &CheckingRun) -> Result<()> {
        let mut guard = self
            .run
            .lock()
            .map_err(|_| crate::WardenError::Other("run state lock poisoned".to_string()))?;
        *guard = Some(run.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let store = MemoryRunStateStore::new();
        let run = store.get_status().unwrap();
        assert_eq!(run.status, RunStatus::Idle);
        assert!(!run.is_active());
    }

    #[test]
    fn test_reset_clears() {
        let store = MemoryRunStateStore::new();
        store.save(&CheckingRun::requested(10, 10)).unwrap();
        assert!(store.get_status().unwrap().is_active());

        store.reset().unwrap();
        assert_eq!(store.get_status().unwrap(), CheckingRun::default());
    }

    #[test]
    fn test_record_checked_keeps_invariants() {
        let mut run = CheckingRun::requested(3, 2);
        run.record_checked(1, true);
        run.record_checked(2, false);
        // A third visit (e.g. re-check after a crash) never pushes past the total.
        run.record_checked(3, true);

        assert_eq!(run.cursor, 3);
        assert_eq!(run.checked_count, 2);
        assert_eq!(run.missing_count, 1);
        assert_eq!(run.just_checked_count, 3);
        assert!(run.missing_count <= run.checked_count);
    }

    #[test]
    fn test_progress_percent() {
        let mut run = CheckingRun::requested(4, 4);
        assert_eq!(run.progress_percent(), 0.0);
        run.record_checked(1, false);
        assert_eq!(run.progress_percent(), 25.0);
        assert_eq!(CheckingRun::requested(0, 0).progress_percent(), 100.0);
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&RunStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }
}
