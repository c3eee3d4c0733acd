//! Catalog methods on FileWarden.

use crate::catalog::{CatalogStore, FileRecord, FileStatus};
use crate::error::Result;
use crate::FileWarden;

impl FileWarden {
    // ========================================
    // Catalog Methods
    // ========================================

    /// Register URIs in the catalog. Already known URIs keep their record.
    pub fn add_files<S: AsRef<str>>(&self, uris: &[S]) -> Result<Vec<FileRecord>> {
        uris.iter()
            .map(|uri| self.catalog.insert(uri.as_ref()))
            .collect()
    }

    /// Number of records carrying `status`.
    pub fn count_files(&self, status: FileStatus) -> Result<u64> {
        self.catalog.count_by_status(status)
    }

    /// Look up a record by URI.
    pub fn find_file(&self, uri: &str) -> Result<Option<FileRecord>> {
        self.catalog.find_by_uri(uri)
    }
}
