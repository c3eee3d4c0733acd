//! Centralized configuration for filewarden.
//!
//! Runtime options (store root, scheme roots, state backend) go through
//! [`crate::FileWardenBuilder`]; this module only holds constants.

use std::time::Duration;

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "filewarden";
    /// Environment variable the CLI reads the store root from.
    pub const ROOT_ENV_VAR: &'static str = "FILEWARDEN_ROOT";
}

/// Bulk checking configuration.
pub struct CheckingConfig;

impl CheckingConfig {
    /// Well-known name of the single run-state slot.
    pub const STATE_KEY: &'static str = "file_checking.run";
    /// Records fetched from the catalog per query inside a slice.
    pub const FETCH_BATCH_SIZE: usize = 100;
    /// Slice budget used when the caller does not give one.
    pub const DEFAULT_SLICE_SECONDS: u64 = 50;
}

/// Catalog database configuration.
pub struct CatalogConfig;

impl CatalogConfig {
    pub const DB_FILENAME: &'static str = "catalog.sqlite";
    pub const BUSY_TIMEOUT_MS: u64 = 30_000;
}

/// Directory and file names under the store root.
pub struct PathsConfig;

impl PathsConfig {
    pub const DATA_DIR_NAME: &'static str = "data";
    pub const FILES_DIR_NAME: &'static str = "files";
    pub const STATE_FILENAME: &'static str = "checking-run.json";
    /// Schemes registered by default, each rooted at `files/<scheme>`.
    pub const DEFAULT_SCHEMES: &'static [&'static str] = &["public", "private"];
    /// Scheme rooted at the system temp directory.
    pub const TEMPORARY_SCHEME: &'static str = "temporary";
}

/// Mapping file layout defaults.
pub struct RepairConfig;

impl RepairConfig {
    /// Full export layout: `id, name, type, expected, current`.
    pub const EXPECTED_COLUMN: usize = 3;
    pub const CURRENT_COLUMN: usize = 4;
    /// Two-column legacy layout: `expected, current`.
    pub const LEGACY_EXPECTED_COLUMN: usize = 0;
    pub const LEGACY_CURRENT_COLUMN: usize = 1;
    pub const DEFAULT_DELIMITER: u8 = b',';
}

/// Converts a caller-supplied second count into a slice budget.
pub fn slice_budget(max_seconds: u64) -> Duration {
    Duration::from_secs(max_seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_columns_are_distinct() {
        assert_ne!(RepairConfig::EXPECTED_COLUMN, RepairConfig::CURRENT_COLUMN);
        assert_ne!(
            RepairConfig::LEGACY_EXPECTED_COLUMN,
            RepairConfig::LEGACY_CURRENT_COLUMN
        );
    }

    #[test]
    fn test_batch_size_is_positive() {
        assert!(CheckingConfig::FETCH_BATCH_SIZE > 0);
        assert_eq!(slice_budget(3), Duration::from_secs(3));
    }
}
