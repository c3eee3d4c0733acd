//! Applies a mapping file to the store, one row at a time.

use super::mapping::MappingRow;
use super::mover::{ConflictPolicy, FileMover};
use crate::catalog::{CatalogStore, FileStatus};
use crate::resolver::PathResolver;
use crate::{Result, WardenError};
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// What happened to one mapping row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// Expected or current path was blank.
    Skipped { line: usize },
    /// The current path does not resolve or is not on disk.
    SourceMissing {
        line: usize,
        uri: String,
        path: Option<PathBuf>,
    },
    /// The expected path does not resolve.
    Unresolvable { line: usize, uri: String },
    /// Something already sits at the expected path.
    DestinationExists {
        line: usize,
        uri: String,
        path: PathBuf,
    },
    /// The catalog has no record for the expected path.
    NoCatalogEntry { line: usize, uri: String },
    /// Move about to happen; only reported when logging.
    Planned {
        line: usize,
        from: PathBuf,
        to: PathBuf,
    },
    Moved {
        line: usize,
        record_id: i64,
        from: PathBuf,
        to: PathBuf,
    },
    MoveFailed {
        line: usize,
        from: PathBuf,
        to: PathBuf,
        message: String,
    },
}

impl RepairOutcome {
    pub fn line(&self) -> usize {
        match self {
            RepairOutcome::Skipped { line }
            | RepairOutcome::SourceMissing { line, .. }
            | RepairOutcome::Unresolvable { line, .. }
            | RepairOutcome::DestinationExists { line, .. }
            | RepairOutcome::NoCatalogEntry { line, .. }
            | RepairOutcome::Planned { line, .. }
            | RepairOutcome::Moved { line, .. }
            | RepairOutcome::MoveFailed { line, .. } => *line,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            RepairOutcome::SourceMissing { .. }
                | RepairOutcome::Unresolvable { .. }
                | RepairOutcome::DestinationExists { .. }
                | RepairOutcome::NoCatalogEntry { .. }
                | RepairOutcome::MoveFailed { .. }
        )
    }
}

impl fmt::Display for RepairOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepairOutcome::Skipped { line } => {
                write!(f, "line {}: skipped, expected or current path is empty", line)
            }
            RepairOutcome::SourceMissing { line, uri, path } => match path {
                Some(path) => write!(
                    f,
                    "line {}: current file {} does not exist ({})",
                    line,
                    uri,
                    path.display()
                ),
                None => write!(f, "line {}: current path {} cannot be resolved", line, uri),
            },
            RepairOutcome::Unresolvable { line, uri } => {
                write!(f, "line {}: expected path {} cannot be resolved", line, uri)
            }
            RepairOutcome::DestinationExists { line, uri, path } => write!(
                f,
                "line {}: expected file {} already exists ({}), not overwriting",
                line,
                uri,
                path.display()
            ),
            RepairOutcome::NoCatalogEntry { line, uri } => {
                write!(f, "line {}: no catalog record for {}", line, uri)
            }
            RepairOutcome::Planned { line, from, to } => write!(
                f,
                "line {}: move {} -> {}",
                line,
                from.display(),
                to.display()
            ),
            RepairOutcome::Moved { line, from, to, .. } => write!(
                f,
                "line {}: moved {} -> {}",
                line,
                from.display(),
                to.display()
            ),
            RepairOutcome::MoveFailed {
                line,
                from,
                to,
                message,
            } => write!(
                f,
                "line {}: failed to move {} -> {}: {}",
                line,
                from.display(),
                to.display(),
                message
            ),
        }
    }
}

/// Position and reason of the structural error that stopped a repair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairAbort {
    pub line: usize,
    pub message: String,
}

/// Everything a repair invocation did, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RepairSummary {
    pub outcomes: Vec<RepairOutcome>,
    pub moved: usize,
    pub skipped: usize,
    pub errors: usize,
    pub aborted: Option<RepairAbort>,
}

impl RepairSummary {
    fn push(&mut self, outcome: RepairOutcome) {
        match &outcome {
            RepairOutcome::Moved { .. } => self.moved += 1,
            RepairOutcome::Skipped { .. } => {
                warn!("Repair {}", outcome);
                self.skipped += 1;
            }
            o if o.is_error() => {
                warn!("Repair {}", o);
                self.errors += 1;
            }
            _ => {}
        }
        self.outcomes.push(outcome);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }
}

/// Moves files back to the paths the catalog expects.
pub struct RepairProcessor<C, R, M> {
    catalog: C,
    resolver: R,
    mover: M,
}

impl<C, R, M> RepairProcessor<C, R, M>
where
    C: CatalogStore,
    R: PathResolver,
    M: FileMover,
{
    pub fn new(catalog: C, resolver: R, mover: M) -> Self {
        Self {
            catalog,
            resolver,
            mover,
        }
    }

    /// Process `rows` in order.
    ///
    /// Every check for a row happens before its move, and an existing file at
    /// the expected path is never overwritten. A structural error from `rows`
    /// stops processing and is recorded in [`RepairSummary::aborted`].
    pub fn repair<I>(&self, rows: I, log: bool) -> Result<RepairSummary>
    where
        I: IntoIterator<Item = Result<MappingRow>>,
    {
        let mut summary = RepairSummary::default();

        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(WardenError::MappingStructure { line, message }) => {
                    warn!("Stopping repair at line {}: {}", line, message);
                    summary.aborted = Some(RepairAbort { line, message });
                    break;
                }
                Err(e) => return Err(e),
            };

            for outcome in self.repair_row(&row, log)? {
                summary.push(outcome);
            }
        }

        info!(
            "Repair done: {} moved, {} skipped, {} errors{}",
            summary.moved,
            summary.skipped,
            summary.errors,
            if summary.is_aborted() { ", aborted" } else { "" }
        );
        Ok(summary)
    }

    fn repair_row(&self, row: &MappingRow, log: bool) -> Result<Vec<RepairOutcome>> {
        let line = row.line;
        if row.expected.is_empty() || row.current.is_empty() {
            return Ok(vec![RepairOutcome::Skipped { line }]);
        }

        let source = match self.resolver.resolve(&row.current) {
            Some(path) if path.is_file() => path,
            path => {
                return Ok(vec![RepairOutcome::SourceMissing {
                    line,
                    uri: row.current.clone(),
                    path,
                }])
            }
        };

        let destination = match self.resolver.resolve(&row.expected) {
            Some(path) => path,
            None => {
                return Ok(vec![RepairOutcome::Unresolvable {
                    line,
                    uri: row.expected.clone(),
                }])
            }
        };
        if destination.exists() {
            return Ok(vec![RepairOutcome::DestinationExists {
                line,
                uri: row.expected.clone(),
                path: destination,
            }]);
        }

        let record = match self.catalog.find_by_uri(&row.expected)? {
            Some(record) => record,
            None => {
                return Ok(vec![RepairOutcome::NoCatalogEntry {
                    line,
                    uri: row.expected.clone(),
                }])
            }
        };

        let mut outcomes = Vec::with_capacity(2);
        if log {
            info!(
                "line {}: move {} -> {}",
                line,
                source.display(),
                destination.display()
            );
            outcomes.push(RepairOutcome::Planned {
                line,
                from: source.clone(),
                to: destination.clone(),
            });
        }

        match self
            .mover
            .move_file(&source, &destination, ConflictPolicy::Replace)
        {
            Ok(()) => {
                self.catalog
                    .mark_checked(record.id, FileStatus::Present, &Utc::now().to_rfc3339())?;
                debug!("Record {} present again at {}", record.id, row.expected);
                outcomes.push(RepairOutcome::Moved {
                    line,
                    record_id: record.id,
                    from: source,
                    to: destination,
                });
            }
            Err(e) => outcomes.push(RepairOutcome::MoveFailed {
                line,
                from: source,
                to: destination,
                message: e.to_string(),
            }),
        }

        Ok(outcomes)
    }
}
