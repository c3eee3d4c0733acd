//! Filesystem moves used by the repair processor.

use crate::{Result, WardenError};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, warn};

/// What to do when the destination already exists at move time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConflictPolicy {
    /// Overwrite the destination.
    #[default]
    Replace,
    /// Leave both files alone and fail.
    Fail,
}

/// Moves a file from one path to another.
pub trait FileMover: Send + Sync {
    fn move_file(&self, source: &Path, destination: &Path, policy: ConflictPolicy) -> Result<()>;
}

/// Moves files on the local filesystem.
///
/// Parent directories of the destination are created. A rename that fails
/// (for example across devices) falls back to copy and remove.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsMover;

impl FsMover {
    pub fn new() -> Self {
        Self
    }
}

impl FileMover for FsMover {
    fn move_file(&self, source: &Path, destination: &Path, policy: ConflictPolicy) -> Result<()> {
        if !source.is_file() {
            return Err(WardenError::FileNotFound(source.to_path_buf()));
        }

        if destination.exists() && policy == ConflictPolicy::Fail {
            return Err(WardenError::Io {
                message: "Destination already exists".to_string(),
                path: Some(destination.to_path_buf()),
                source: None,
            });
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| WardenError::io_with_path(e, parent))?;
        }

        if let Err(rename_err) = fs::rename(source, destination) {
            debug!(
                "Rename {} -> {} failed ({}), copying instead",
                source.display(),
                destination.display(),
                rename_err
            );
            copy_then_remove(source, destination, |p| fs::remove_file(p))?;
        }

        debug!("Moved {} -> {}", source.display(), destination.display());
        Ok(())
    }
}

/// Copy `source` next to `destination`, drop the source, then rename the copy
/// into place. If the source cannot be removed the copy is discarded, so the
/// destination is never touched by a failed move.
fn copy_then_remove<F>(source: &Path, destination: &Path, remove_source: F) -> Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = destination.with_file_name(format!(".{}.moving", file_name));

    if let Err(e) = fs::copy(source, &staged) {
        let _ = fs::remove_file(&staged);
        return Err(WardenError::io_with_path(e, &staged));
    }

    if let Err(e) = remove_source(source) {
        if let Err(cleanup) = fs::remove_file(&staged) {
            warn!("Failed to discard {}: {}", staged.display(), cleanup);
        }
        return Err(WardenError::io_with_path(e, source));
    }

    fs::rename(&staged, destination).map_err(|e| WardenError::io_with_path(e, destination))
}
