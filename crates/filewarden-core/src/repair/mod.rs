//! Bulk relocation of files listed in a mapping file.
//!
//! Each mapping row names the path the catalog expects a file at and the path
//! it currently sits at. Rows are validated one by one, and only rows that
//! pass every check result in a move.

mod mapping;
mod mover;
mod processor;

pub use mapping::{MappingLayout, MappingReader, MappingRow};
pub use mover::{ConflictPolicy, FileMover, FsMover};
pub use processor::{RepairAbort, RepairOutcome, RepairProcessor, RepairSummary};
