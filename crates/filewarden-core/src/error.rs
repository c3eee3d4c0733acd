//! Error types for filewarden.
//!
//! Per-row repair validation failures are *not* errors; they are reported as
//! [`crate::repair::RepairOutcome`] values. This enum covers infrastructure
//! failures and the one fatal input condition (a structurally broken mapping
//! file).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for filewarden.
#[derive(Debug, Error)]
pub enum WardenError {
    // Database errors
    #[error("Database error: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<rusqlite::Error>,
    },

    // File system errors
    #[error("IO error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    // Serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    #[error("CSV error: {message}")]
    Csv {
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// The mapping file cannot be framed past `line`; nothing after it is trusted.
    #[error("Malformed mapping row at line {line}: {message}")]
    MappingStructure { line: usize, message: String },

    // Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Validation errors
    #[error("Validation error for {field}: {message}")]
    Validation { field: String, message: String },

    // Generic errors
    #[error("{0}")]
    Other(String),
}

/// Result type alias for filewarden operations.
pub type Result<T> = std::result::Result<T, WardenError>;

impl From<std::io::Error> for WardenError {
    fn from(err: std::io::Error) -> Self {
        WardenError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        WardenError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<rusqlite::Error> for WardenError {
    fn from(err: rusqlite::Error) -> Self {
        WardenError::Database {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<csv::Error> for WardenError {
    fn from(err: csv::Error) -> Self {
        let line = err
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or_default();
        if line > 0 {
            WardenError::MappingStructure {
                line,
                message: err.to_string(),
            }
        } else {
            WardenError::Csv {
                message: err.to_string(),
                source: Some(err),
            }
        }
    }
}

impl WardenError {
    /// Create an IO error with path context.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        WardenError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a database error for a poisoned connection lock.
    pub(crate) fn lock_poisoned(what: &str) -> Self {
        WardenError::Database {
            message: format!("Failed to acquire {} connection lock", what),
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WardenError::MappingStructure {
            line: 7,
            message: "expected 5 fields, found 2".into(),
        };
        assert_eq!(
            err.to_string(),
            "Malformed mapping row at line 7: expected 5 fields, found 2"
        );
    }

    #[test]
    fn test_io_with_path_keeps_path() {
        let err = WardenError::io_with_path(
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
            "/tmp/x",
        );
        match err {
            WardenError::Io { path, .. } => assert_eq!(path, Some(PathBuf::from("/tmp/x"))),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
