//! Checking run methods on FileWarden.

use crate::checking::SliceReport;
use crate::error::Result;
use crate::run_state::CheckingRun;
use crate::FileWarden;

impl FileWarden {
    // ========================================
    // Checking Run Methods
    // ========================================

    /// Request a checking run. Returns `false` if one is already active.
    pub fn start_checking(&self) -> Result<bool> {
        self.engine.start()
    }

    /// Cancel the current run, if any.
    pub fn cancel_checking(&self) -> Result<CheckingRun> {
        self.engine.cancel()
    }

    /// Run one time-bounded slice of the active run.
    ///
    /// The catalog WAL is checkpointed once the run finishes.
    pub fn execute_checking(&self, max_seconds: u64, log: bool) -> Result<SliceReport> {
        let report = self.engine.execute_in_background(max_seconds, log)?;
        if report.finished && !report.aborted {
            self.catalog.checkpoint_wal()?;
        }
        Ok(report)
    }

    /// Snapshot of the current run.
    pub fn checking_status(&self) -> Result<CheckingRun> {
        self.engine.status()
    }
}
