//! File-metadata catalog.
//!
//! This module provides:
//! - The [`CatalogStore`] capability the checking engine and repair processor consume
//! - [`FileRecord`] / [`FileStatus`] record types
//! - [`SqliteCatalog`], the bundled SQLite-backed store

mod sqlite;

pub use sqlite::SqliteCatalog;

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Existence status of a catalog record, as of its last visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    #[default]
    Unknown,
    Present,
    Missing,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Unknown => "unknown",
            FileStatus::Present => "present",
            FileStatus::Missing => "missing",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "unknown" => Some(FileStatus::Unknown),
            "present" => Some(FileStatus::Present),
            "missing" => Some(FileStatus::Missing),
            _ => None,
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record in the file catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Monotonic identity; also the checking order.
    pub id: i64,
    /// Logical URI of the file's expected location.
    pub uri: String,
    pub status: FileStatus,
    /// RFC 3339 timestamp of the last existence check.
    pub checked_at: Option<String>,
}

/// Catalog capability consumed by the checking engine and repair processor.
///
/// Enumeration is always by ascending `id`. Callers page with
/// [`CatalogStore::records_after`] using the last seen id as the cursor, so
/// deleting records between calls never shifts the position.
pub trait CatalogStore: Send + Sync {
    /// Highest record id, or 0 for an empty catalog.
    fn max_id(&self) -> Result<i64>;

    /// Number of records with a stored URI and `id <= upper_id`.
    fn count_up_to(&self, upper_id: i64) -> Result<u64>;

    /// Up to `limit` records with `cursor < id <= upper_id`, ascending by id.
    fn records_after(&self, cursor: i64, upper_id: i64, limit: usize) -> Result<Vec<FileRecord>>;

    /// Zero-or-one record whose URI equals `uri`.
    fn find_by_uri(&self, uri: &str) -> Result<Option<FileRecord>>;

    /// Store the result of an existence check.
    fn mark_checked(&self, id: i64, status: FileStatus, checked_at: &str) -> Result<()>;
}

impl<T: CatalogStore + ?Sized> CatalogStore for Arc<T> {
    fn max_id(&self) -> Result<i64> {
        (**self).max_id()
    }

    fn count_up_to(&self, upper_id: i64) -> Result<u64> {
        (**self).count_up_to(upper_id)
    }

    fn records_after(&self, cursor: i64, upper_id: i64, limit: usize) -> Result<Vec<FileRecord>> {
        (**self).records_after(cursor, upper_id, limit)
    }

    fn find_by_uri(&self, uri: &str) -> Result<Option<FileRecord>> {
        (**self).find_by_uri(uri)
    }

    fn mark_checked(&self, id: i64, status: FileStatus, checked_at: &str) -> Result<()> {
        (**self).mark_checked(id, status, checked_at)
    }
}
