//! Bulk existence checking in bounded time slices.
//!
//! A pass is requested with [`CheckingEngine::start`], then advanced by
//! repeated [`CheckingEngine::execute_in_background`] calls, each of which
//! stops once its time budget is used up. Progress lives in the injected
//! [`RunStateStore`], so consecutive slices may come from different
//! processes.

mod engine;

pub use engine::CheckingEngine;

use crate::catalog::FileStatus;
use crate::run_state::CheckingRun;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of checking one catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckedFile {
    pub id: i64,
    pub uri: String,
    /// `None` when the URI could not be resolved.
    pub path: Option<PathBuf>,
    pub status: FileStatus,
}

/// Result of one execution slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SliceReport {
    pub files_just_checked: u64,
    pub files_checked_count: u64,
    pub files_to_check: u64,
    pub files_missing_count: u64,
    pub finished: bool,
    /// No run was requested; nothing was done.
    pub aborted: bool,
    /// Missing files found in this slice, collected only when logging.
    pub missing_files: Vec<CheckedFile>,
}

impl SliceReport {
    pub(crate) fn from_run(run: &CheckingRun, missing_files: Vec<CheckedFile>) -> Self {
        Self {
            files_just_checked: run.just_checked_count,
            files_checked_count: run.checked_count,
            files_to_check: run.total_to_check,
            files_missing_count: run.missing_count,
            finished: run.is_finished(),
            aborted: false,
            missing_files,
        }
    }

    pub(crate) fn aborted(run: &CheckingRun) -> Self {
        Self {
            files_checked_count: run.checked_count,
            files_to_check: run.total_to_check,
            files_missing_count: run.missing_count,
            finished: run.is_finished(),
            aborted: true,
            ..Default::default()
        }
    }
}
