//! The checking run state machine.

use super::{CheckedFile, SliceReport};
use crate::catalog::{CatalogStore, FileRecord, FileStatus};
use crate::config::{slice_budget, CheckingConfig};
use crate::resolver::PathResolver;
use crate::run_state::{CheckingRun, RunStateStore, RunStatus};
use crate::Result;
use chrono::Utc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Drives checking runs over a catalog.
///
/// The engine holds no progress of its own; every call reloads the run from
/// `state` and saves it back. Callers must not overlap slices against the
/// same store.
pub struct CheckingEngine<C, R, S> {
    catalog: C,
    resolver: R,
    state: S,
}

impl<C, R, S> CheckingEngine<C, R, S>
where
    C: CatalogStore,
    R: PathResolver,
    S: RunStateStore,
{
    pub fn new(catalog: C, resolver: R, state: S) -> Self {
        Self {
            catalog,
            resolver,
            state,
        }
    }

    /// Current run snapshot.
    pub fn status(&self) -> Result<CheckingRun> {
        self.state.get_status()
    }

    /// Request a new run over every record currently in the catalog.
    ///
    /// Returns `false` without touching anything when a run is already
    /// requested or in progress.
    pub fn start(&self) -> Result<bool> {
        let current = self.state.get_status()?;
        if current.is_active() {
            info!(
                "Checking run already {} ({}/{} checked)",
                current.status, current.checked_count, current.total_to_check
            );
            return Ok(false);
        }

        self.state.reset()?;
        let upper = self.catalog.max_id()?;
        let total = self.catalog.count_up_to(upper)?;
        let run = CheckingRun::requested(upper, total);
        self.state.save(&run)?;

        info!("Requested checking run over {} files (ids <= {})", total, upper);
        Ok(true)
    }

    /// Cancel whatever run exists. Counts and cursor are cleared so the next
    /// `start` begins from scratch.
    pub fn cancel(&self) -> Result<CheckingRun> {
        let previous = self.state.get_status()?;
        let mut run = CheckingRun {
            status: RunStatus::Cancelled,
            ..Default::default()
        };
        run.touch();
        self.state.save(&run)?;

        info!(
            "Cancelled checking run (was {}, {}/{} checked)",
            previous.status, previous.checked_count, previous.total_to_check
        );
        Ok(run)
    }

    /// Check records until `max_seconds` have elapsed or the run is done.
    ///
    /// At least one record is processed whenever any remain, so a zero budget
    /// still makes progress. With `log` set, missing files are returned in
    /// the report as well as logged.
    pub fn execute_in_background(&self, max_seconds: u64, log: bool) -> Result<SliceReport> {
        let started = Instant::now();
        let budget = slice_budget(max_seconds);

        let mut run = self.state.get_status()?;
        if !run.is_active() {
            debug!("No checking run requested (status {})", run.status);
            return Ok(SliceReport::aborted(&run));
        }

        if run.status == RunStatus::Requested {
            info!("Checking run in progress: {} files enrolled", run.total_to_check);
            run.status = RunStatus::InProgress;
        }
        run.just_checked_count = 0;

        let mut missing_files = Vec::new();
        let mut out_of_time = false;

        while !out_of_time {
            let batch = self.catalog.records_after(
                run.cursor,
                run.enrolled_upper_id,
                CheckingConfig::FETCH_BATCH_SIZE,
            )?;
            if batch.is_empty() {
                run.status = RunStatus::Finished;
                break;
            }

            for record in &batch {
                let checked = self.check_record(record)?;
                let missing = checked.status == FileStatus::Missing;
                run.record_checked(record.id, missing);

                if missing {
                    warn!(
                        "Missing file {} (id {}) at {}",
                        checked.uri,
                        checked.id,
                        checked
                            .path
                            .as_ref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| "<unresolvable>".to_string())
                    );
                    if log {
                        missing_files.push(checked);
                    }
                }

                if started.elapsed() >= budget {
                    out_of_time = true;
                    break;
                }
            }

            run.touch();
            self.state.save(&run)?;
        }

        if out_of_time && !run.is_finished() {
            let remaining = self
                .catalog
                .records_after(run.cursor, run.enrolled_upper_id, 1)?;
            if remaining.is_empty() {
                run.status = RunStatus::Finished;
            }
        }

        run.touch();
        self.state.save(&run)?;

        if run.is_finished() {
            info!(
                "Checking run finished: {} checked, {} missing",
                run.checked_count, run.missing_count
            );
        } else {
            debug!(
                "Slice checked {} files ({}/{})",
                run.just_checked_count, run.checked_count, run.total_to_check
            );
        }

        Ok(SliceReport::from_run(&run, missing_files))
    }

    fn check_record(&self, record: &FileRecord) -> Result<CheckedFile> {
        let path = self.resolver.resolve(&record.uri);
        let status = match &path {
            Some(p) if p.exists() => FileStatus::Present,
            _ => FileStatus::Missing,
        };

        self.catalog
            .mark_checked(record.id, status, &Utc::now().to_rfc3339())?;

        Ok(CheckedFile {
            id: record.id,
            uri: record.uri.clone(),
            path,
            status,
        })
    }
}
