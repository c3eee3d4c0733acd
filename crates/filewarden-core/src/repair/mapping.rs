//! Reader for delimited (expected, current) mapping files.

use crate::config::RepairConfig;
use crate::{Result, WardenError};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Which columns of a mapping file hold the two logical paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingLayout {
    pub expected_column: usize,
    pub current_column: usize,
    pub has_headers: bool,
    pub delimiter: u8,
}

impl Default for MappingLayout {
    /// Five columns: `id, name, type, expected, current`.
    fn default() -> Self {
        Self {
            expected_column: RepairConfig::EXPECTED_COLUMN,
            current_column: RepairConfig::CURRENT_COLUMN,
            has_headers: false,
            delimiter: RepairConfig::DEFAULT_DELIMITER,
        }
    }
}

impl MappingLayout {
    /// Two columns: `expected, current`.
    pub fn legacy() -> Self {
        Self {
            expected_column: RepairConfig::LEGACY_EXPECTED_COLUMN,
            current_column: RepairConfig::LEGACY_CURRENT_COLUMN,
            ..Self::default()
        }
    }

    pub fn with_headers(mut self, has_headers: bool) -> Self {
        self.has_headers = has_headers;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Fewest fields a row may have.
    pub fn min_fields(&self) -> usize {
        self.expected_column.max(self.current_column) + 1
    }
}

/// One mapping entry. `line` is 1-based in the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRow {
    pub line: usize,
    pub expected: String,
    pub current: String,
}

/// Streams [`MappingRow`]s out of a delimited file.
///
/// The first structural problem (a short row or broken quoting) is yielded
/// as [`WardenError::MappingStructure`] and ends the stream.
pub struct MappingReader<R> {
    reader: csv::Reader<R>,
    layout: MappingLayout,
    record: StringRecord,
    done: bool,
}

impl MappingReader<File> {
    pub fn from_path(path: &Path, layout: MappingLayout) -> Result<Self> {
        if !path.exists() {
            return Err(WardenError::FileNotFound(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|e| WardenError::io_with_path(e, path))?;
        Ok(Self::from_reader(file, layout))
    }
}

impl<R: Read> MappingReader<R> {
    pub fn from_reader(input: R, layout: MappingLayout) -> Self {
        let reader = ReaderBuilder::new()
            .has_headers(layout.has_headers)
            .delimiter(layout.delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(input);

        Self {
            reader,
            layout,
            record: StringRecord::new(),
            done: false,
        }
    }

    fn next_row(&mut self) -> Result<Option<MappingRow>> {
        if !self.reader.read_record(&mut self.record)? {
            return Ok(None);
        }

        let line = self
            .record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();

        let needed = self.layout.min_fields();
        if self.record.len() < needed {
            return Err(WardenError::MappingStructure {
                line,
                message: format!("expected {} fields, found {}", needed, self.record.len()),
            });
        }

        let field = |i: usize| self.record.get(i).unwrap_or_default().to_string();
        Ok(Some(MappingRow {
            line,
            expected: field(self.layout.expected_column),
            current: field(self.layout.current_column),
        }))
    }
}

impl<R: Read> Iterator for MappingReader<R> {
    type Item = Result<MappingRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_row() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
