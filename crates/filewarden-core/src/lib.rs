//! FileWarden Core - integrity checking and repair for a managed file store.
//!
//! A SQLite catalog lists files by logical URI (`public://images/x.png`).
//! A checking run walks the catalog in bounded time slices and records which
//! files are missing on disk; progress survives between process invocations.
//! A repair pass moves files listed in a mapping file back to the paths the
//! catalog expects.
//!
//! # Example
//!
//! ```rust,ignore
//! use filewarden_core::FileWarden;
//!
//! fn main() -> filewarden_core::Result<()> {
//!     let warden = FileWarden::new("/srv/store")?;
//!
//!     warden.start_checking()?;
//!     loop {
//!         let report = warden.execute_checking(50, true)?;
//!         println!("{}/{} checked", report.files_checked_count, report.files_to_check);
//!         if report.finished || report.aborted {
//!             break;
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod checking;
pub mod config;
pub mod error;
pub mod repair;
pub mod resolver;
pub mod run_state;

mod api;

// Re-export commonly used types
pub use catalog::{CatalogStore, FileRecord, FileStatus, SqliteCatalog};
pub use checking::{CheckedFile, CheckingEngine, SliceReport};
pub use error::{Result, WardenError};
pub use repair::{
    ConflictPolicy, FileMover, FsMover, MappingLayout, MappingReader, MappingRow, RepairAbort,
    RepairOutcome, RepairProcessor, RepairSummary,
};
pub use resolver::{PathResolver, SchemeResolver};
pub use run_state::{
    CheckingRun, JsonRunStateStore, MemoryRunStateStore, RunStateStore, RunStatus,
    SqliteRunStateStore,
};

// Re-export builder from api module
pub use api::{FileWardenBuilder, StateBackend};

use std::path::{Path, PathBuf};
use std::sync::Arc;

type SharedCatalog = Arc<SqliteCatalog>;
type SharedResolver = Arc<SchemeResolver>;

/// Main API struct for FileWarden operations.
///
/// Wires a [`SqliteCatalog`], a [`SchemeResolver`] and a run-state store
/// rooted at one store directory. Use [`CheckingEngine`] and
/// [`RepairProcessor`] directly to plug in other collaborators.
pub struct FileWarden {
    root: PathBuf,
    catalog: SharedCatalog,
    resolver: SharedResolver,
    engine: CheckingEngine<SharedCatalog, SharedResolver, Arc<dyn RunStateStore>>,
    repair: RepairProcessor<SharedCatalog, SharedResolver, FsMover>,
}

impl FileWarden {
    /// Create a builder for FileWarden.
    pub fn builder(root: impl Into<PathBuf>) -> FileWardenBuilder {
        FileWardenBuilder::new(root)
    }

    /// Open the store at `root`, creating its directories as needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        FileWardenBuilder::new(root).auto_create_dirs(true).build()
    }

    /// Store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &SqliteCatalog {
        &self.catalog
    }

    pub fn resolver(&self) -> &SchemeResolver {
        &self.resolver
    }
}
