//! Repair methods on FileWarden.

use crate::error::Result;
use crate::repair::{MappingLayout, MappingReader, MappingRow, RepairSummary};
use crate::FileWarden;
use std::path::Path;
use tracing::info;

impl FileWarden {
    // ========================================
    // Repair Methods
    // ========================================

    /// Apply a mapping file laid out as `layout`.
    pub fn repair_from_file(
        &self,
        mapping_file: &Path,
        layout: MappingLayout,
        log: bool,
    ) -> Result<RepairSummary> {
        info!("Repairing from {}", mapping_file.display());
        let rows = MappingReader::from_path(mapping_file, layout)?;
        self.repair.repair(rows, log)
    }

    /// Apply already parsed mapping rows.
    pub fn repair_rows<I>(&self, rows: I, log: bool) -> Result<RepairSummary>
    where
        I: IntoIterator<Item = Result<MappingRow>>,
    {
        self.repair.repair(rows, log)
    }
}
