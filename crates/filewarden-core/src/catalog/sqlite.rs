//! SQLite file catalog.

use super::{CatalogStore, FileRecord, FileStatus};
use crate::config::CatalogConfig;
use crate::{Result, WardenError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// SQLite-backed catalog of managed files.
///
/// The connection is shared with [`crate::run_state::SqliteRunStateStore`]
/// when both live in the same database file.
pub struct SqliteCatalog {
    db_path: PathBuf,
    conn: Arc<Mutex<Connection>>,
}

impl SqliteCatalog {
    /// Create or open a catalog at the given path.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WardenError::Io {
                    message: format!("Failed to create directory {}", parent.display()),
                    path: Some(parent.to_path_buf()),
                    source: Some(e),
                })?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;
        Self::ensure_schema(&conn)?;

        Ok(Self {
            db_path,
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory catalog.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::ensure_schema(&conn)?;
        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA busy_timeout={};\n\
             PRAGMA synchronous=NORMAL;\n\
             PRAGMA temp_store=MEMORY;",
            CatalogConfig::BUSY_TIMEOUT_MS,
        ))?;
        Ok(())
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uri TEXT NOT NULL UNIQUE,
                status TEXT NOT NULL DEFAULT 'unknown',
                checked_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_files_status ON files(status);",
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| WardenError::lock_poisoned("catalog"))
    }

    /// Get the database path.
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Shared handle to the underlying connection.
    pub(crate) fn shared_connection(&self) -> Arc<Mutex<Connection>> {
        Arc::clone(&self.conn)
    }

    /// Register a URI, returning the record. Idempotent for an existing URI.
    pub fn insert(&self, uri: &str) -> Result<FileRecord> {
        if uri.trim().is_empty() {
            return Err(WardenError::Validation {
                field: "uri".to_string(),
                message: "URI must not be blank".to_string(),
            });
        }

        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO files (uri) VALUES (?1) ON CONFLICT(uri) DO NOTHING",
            params![uri],
        )?;
        let record = conn.query_row(
            "SELECT id, uri, status, checked_at FROM files WHERE uri = ?1",
            params![uri],
            Self::row_to_record,
        )?;

        debug!("Registered file {} as id {}", uri, record.id);
        Ok(record)
    }

    /// Get a record by id.
    pub fn get(&self, id: i64) -> Result<Option<FileRecord>> {
        let conn = self.lock_conn()?;
        let record = conn
            .query_row(
                "SELECT id, uri, status, checked_at FROM files WHERE id = ?1",
                params![id],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    /// Delete a record by id.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let conn = self.lock_conn()?;
        let rows_affected = conn.execute("DELETE FROM files WHERE id = ?1", params![id])?;
        if rows_affected > 0 {
            debug!("Deleted file record {}", id);
        }
        Ok(rows_affected > 0)
    }

    /// Total number of records.
    pub fn count(&self) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    /// Number of records currently carrying `status`.
    pub fn count_by_status(&self, status: FileStatus) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM files WHERE status = ?1",
            params![status.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Checkpoint the WAL file.
    pub fn checkpoint_wal(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        debug!("Checkpointed catalog WAL");
        Ok(())
    }

    fn row_to_record(row: &Row) -> rusqlite::Result<FileRecord> {
        let status: String = row.get(2)?;
        let status = FileStatus::from_str(&status).unwrap_or_else(|| {
            warn!("Unknown file status '{}' in catalog", status);
            FileStatus::Unknown
        });

        Ok(FileRecord {
            id: row.get(0)?,
            uri: row.get(1)?,
            status,
            checked_at: row.get(3)?,
        })
    }
}

impl CatalogStore for SqliteCatalog {
    fn max_id(&self) -> Result<i64> {
        let conn = self.lock_conn()?;
        let max: Option<i64> = conn.query_row("SELECT MAX(id) FROM files", [], |row| row.get(0))?;
        Ok(max.unwrap_or(0))
    }

    fn count_up_to(&self, upper_id: i64) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM files WHERE id <= ?1 AND uri <> ''",
            params![upper_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn records_after(&self, cursor: i64, upper_id: i64, limit: usize) -> Result<Vec<FileRecord>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, uri, status, checked_at FROM files
             WHERE id > ?1 AND id <= ?2 AND uri <> ''
             ORDER BY id ASC LIMIT ?3",
        )?;
        let rows = stmt.query_map(params![cursor, upper_id, limit as i64], Self::row_to_record)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn find_by_uri(&self, uri: &str) -> Result<Option<FileRecord>> {
        let conn = self.lock_conn()?;
        let record = conn
            .query_row(
                "SELECT id, uri, status, checked_at FROM files WHERE uri = ?1",
                params![uri],
                Self::row_to_record,
            )
            .optional()?;
        Ok(record)
    }

    fn mark_checked(&self, id: i64, status: FileStatus, checked_at: &str) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute(
            "UPDATE files SET status = ?1, checked_at = ?2 WHERE id = ?3",
            params![status.as_str(), checked_at, id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_catalog() -> (SqliteCatalog, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let catalog = SqliteCatalog::open(temp_dir.path().join("catalog.sqlite")).unwrap();
        (catalog, temp_dir)
    }

    #[test]
    fn test_insert_and_find() {
        let (catalog, _temp) = create_test_catalog();

        let record = catalog.insert("public://a.png").unwrap();
        assert_eq!(record.status, FileStatus::Unknown);

        let found = catalog.find_by_uri("public://a.png").unwrap().unwrap();
        assert_eq!(found.id, record.id);
        assert!(catalog.find_by_uri("public://b.png").unwrap().is_none());
    }

    #[test]
    fn test_insert_is_idempotent() {
        let (catalog, _temp) = create_test_catalog();

        let first = catalog.insert("public://a.png").unwrap();
        let second = catalog.insert("public://a.png").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(catalog.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_rejects_blank() {
        let (catalog, _temp) = create_test_catalog();
        assert!(catalog.insert("  ").is_err());
    }

    #[test]
    fn test_records_after_pages_by_id() {
        let (catalog, _temp) = create_test_catalog();
        for i in 1..=5 {
            catalog.insert(&format!("public://{}.txt", i)).unwrap();
        }
        let upper = catalog.max_id().unwrap();

        let first = catalog.records_after(0, upper, 2).unwrap();
        assert_eq!(first.len(), 2);

        let cursor = first.last().unwrap().id;
        catalog.delete(cursor + 1).unwrap();

        let rest = catalog.records_after(cursor, upper, 10).unwrap();
        let uris: Vec<_> = rest.iter().map(|r| r.uri.as_str()).collect();
        assert_eq!(uris, vec!["public://4.txt", "public://5.txt"]);
    }

    #[test]
    fn test_upper_bound_excludes_new_records() {
        let (catalog, _temp) = create_test_catalog();
        catalog.insert("public://old.txt").unwrap();
        let upper = catalog.max_id().unwrap();
        catalog.insert("public://new.txt").unwrap();

        assert_eq!(catalog.count_up_to(upper).unwrap(), 1);
        assert_eq!(catalog.records_after(0, upper, 10).unwrap().len(), 1);
    }

    #[test]
    fn test_mark_checked_and_count_by_status() {
        let (catalog, _temp) = create_test_catalog();
        let a = catalog.insert("public://a").unwrap();
        let b = catalog.insert("public://b").unwrap();

        catalog
            .mark_checked(a.id, FileStatus::Present, "2024-01-01T00:00:00Z")
            .unwrap();
        catalog
            .mark_checked(b.id, FileStatus::Missing, "2024-01-01T00:00:00Z")
            .unwrap();

        assert_eq!(catalog.count_by_status(FileStatus::Missing).unwrap(), 1);
        let loaded = catalog.get(a.id).unwrap().unwrap();
        assert_eq!(loaded.status, FileStatus::Present);
        assert_eq!(loaded.checked_at.as_deref(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_checkpoint_truncates_wal() {
        let (catalog, temp) = create_test_catalog();
        for i in 0..10 {
            catalog.insert(&format!("public://{}.txt", i)).unwrap();
        }
        let wal = temp.path().join("catalog.sqlite-wal");
        assert!(wal.metadata().unwrap().len() > 0);

        catalog.checkpoint_wal().unwrap();
        assert_eq!(wal.metadata().unwrap().len(), 0);
        assert_eq!(catalog.count().unwrap(), 10);
    }

    #[test]
    fn test_max_id_empty() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        assert_eq!(catalog.max_id().unwrap(), 0);
        assert_eq!(catalog.count_up_to(0).unwrap(), 0);
    }
}
