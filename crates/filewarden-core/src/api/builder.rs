//! Builder for configuring FileWarden initialization.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::SqliteCatalog;
use crate::checking::CheckingEngine;
use crate::config::{CatalogConfig, PathsConfig};
use crate::error::{Result, WardenError};
use crate::repair::{FsMover, RepairProcessor};
use crate::resolver::SchemeResolver;
use crate::run_state::{JsonRunStateStore, RunStateStore, SqliteRunStateStore};
use crate::FileWarden;

/// Where the checking run is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StateBackend {
    /// A slot in the catalog database.
    #[default]
    Sqlite,
    /// `data/checking-run.json` next to the catalog.
    Json,
}

/// Builder for configuring FileWarden initialization.
///
/// # Example
///
/// ```rust,ignore
/// use filewarden_core::FileWarden;
///
/// let warden = FileWarden::builder("./store")
///     .auto_create_dirs(true)
///     .with_scheme("archive", "/mnt/archive")
///     .build()?;
/// ```
pub struct FileWardenBuilder {
    root: PathBuf,
    auto_create_dirs: bool,
    schemes: Vec<(String, PathBuf)>,
    state_backend: StateBackend,
}

impl FileWardenBuilder {
    /// Create a new builder with the store root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            auto_create_dirs: false,
            schemes: Vec::new(),
            state_backend: StateBackend::default(),
        }
    }

    /// Auto-create required directories if they don't exist.
    ///
    /// When enabled, the builder will create the following directories:
    /// - `data/`
    /// - `files/public/`
    /// - `files/private/`
    ///
    /// Default: `false` (the root must exist)
    pub fn auto_create_dirs(mut self, enable: bool) -> Self {
        self.auto_create_dirs = enable;
        self
    }

    /// Root `scheme://` URIs at `dir`, replacing any default for that scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        self.schemes.push((scheme.into(), dir.into()));
        self
    }

    /// Default: [`StateBackend::Sqlite`]
    pub fn state_backend(mut self, backend: StateBackend) -> Self {
        self.state_backend = backend;
        self
    }

    fn create_directory_structure(root: &Path) -> Result<()> {
        let mut dirs = vec![root.join(PathsConfig::DATA_DIR_NAME)];
        for scheme in PathsConfig::DEFAULT_SCHEMES {
            dirs.push(root.join(PathsConfig::FILES_DIR_NAME).join(scheme));
        }

        for dir in &dirs {
            if !dir.exists() {
                std::fs::create_dir_all(dir).map_err(|e| WardenError::Io {
                    message: format!("Failed to create directory: {}", dir.display()),
                    path: Some(dir.clone()),
                    source: Some(e),
                })?;
            }
        }

        Ok(())
    }

    /// Build the FileWarden instance.
    pub fn build(self) -> Result<FileWarden> {
        if self.auto_create_dirs {
            Self::create_directory_structure(&self.root)?;
        } else if !self.root.exists() {
            return Err(WardenError::Config {
                message: format!("Store root does not exist: {}", self.root.display()),
            });
        }

        let data_dir = self.root.join(PathsConfig::DATA_DIR_NAME);
        let catalog = Arc::new(SqliteCatalog::open(
            data_dir.join(CatalogConfig::DB_FILENAME),
        )?);

        let mut resolver =
            SchemeResolver::with_defaults(&self.root.join(PathsConfig::FILES_DIR_NAME));
        for (scheme, dir) in self.schemes {
            resolver.insert(scheme, dir);
        }
        let resolver = Arc::new(resolver);

        let state: Arc<dyn RunStateStore> = match self.state_backend {
            StateBackend::Sqlite => Arc::new(SqliteRunStateStore::from_catalog(&catalog)?),
            StateBackend::Json => Arc::new(JsonRunStateStore::new(
                data_dir.join(PathsConfig::STATE_FILENAME),
            )),
        };

        tracing::debug!(
            "Opened store at {} ({:?} run state)",
            self.root.display(),
            self.state_backend
        );

        Ok(FileWarden {
            engine: CheckingEngine::new(Arc::clone(&catalog), Arc::clone(&resolver), state),
            repair: RepairProcessor::new(Arc::clone(&catalog), Arc::clone(&resolver), FsMover),
            root: self.root,
            catalog,
            resolver,
        })
    }
}
