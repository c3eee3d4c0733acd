//! Run state kept in a standalone JSON file.

use super::{CheckingRun, RunStateStore};
use crate::{Result, WardenError};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Stores the run as a single JSON document.
///
/// Each save writes `<file>.tmp`, syncs it and renames it over the state file,
/// after copying the previous state to `<file>.bak`. If the state file cannot
/// be parsed on load, the backup is used instead.
#[derive(Debug, Clone)]
pub struct JsonRunStateStore {
    path: PathBuf,
}

impl JsonRunStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        self.path.with_extension("json.bak")
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    fn read_run(path: &Path) -> Result<Option<CheckingRun>> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WardenError::io_with_path(e, path)),
        };

        let run = serde_json::from_str(&contents).map_err(|e| WardenError::Json {
            message: format!("Failed to parse {}: {}", path.display(), e),
            source: Some(e),
        })?;
        Ok(Some(run))
    }
}

impl RunStateStore for JsonRunStateStore {
    fn load(&self) -> Result<Option<CheckingRun>> {
        match Self::read_run(&self.path) {
            Err(WardenError::Json { message, .. }) => {
                let backup = self.backup_path();
                match Self::read_run(&backup)? {
                    Some(run) => {
                        warn!("{}; using {}", message, backup.display());
                        Ok(Some(run))
                    }
                    None => Err(WardenError::Json {
                        message,
                        source: None,
                    }),
                }
            }
            other => other,
        }
    }

    fn save(&self, run: &CheckingRun) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| WardenError::io_with_path(e, parent))?;
            }
        }

        let serialized = serde_json::to_string_pretty(run)?;
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .map_err(|e| WardenError::io_with_path(e, &temp_path))?;
            file.write_all(serialized.as_bytes())
                .and_then(|_| file.sync_all())
                .map_err(|e| WardenError::io_with_path(e, &temp_path))?;
        }

        // Only a parseable state is worth keeping as the fallback.
        if Self::read_run(&self.path).map(|r| r.is_some()).unwrap_or(false) {
            let backup = self.backup_path();
            if let Err(e) = fs::copy(&self.path, &backup) {
                warn!("Failed to back up run state to {}: {}", backup.display(), e);
            }
        }

        fs::rename(&temp_path, &self.path).map_err(|e| WardenError::io_with_path(e, &self.path))?;
        debug!("Saved run state to {} ({})", self.path.display(), run.status);
        Ok(())
    }
}
