//! Run state kept in a named slot of a SQLite database.

use super::{CheckingRun, RunStateStore};
use crate::catalog::SqliteCatalog;
use crate::config::{CatalogConfig, CheckingConfig};
use crate::{Result, WardenError};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Key-value state slot table. The run is stored as JSON under
/// [`CheckingConfig::STATE_KEY`] unless another key is given.
pub struct SqliteRunStateStore {
    conn: Arc<Mutex<Connection>>,
    key: String,
}

impl SqliteRunStateStore {
    /// Share the catalog's database connection.
    pub fn from_catalog(catalog: &SqliteCatalog) -> Result<Self> {
        Self::with_connection(catalog.shared_connection(), CheckingConfig::STATE_KEY)
    }

    /// Open a standalone state database.
    pub fn open(db_path: &Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\nPRAGMA busy_timeout={};",
            CatalogConfig::BUSY_TIMEOUT_MS
        ))?;
        Self::with_connection(Arc::new(Mutex::new(conn)), CheckingConfig::STATE_KEY)
    }

    fn with_connection(conn: Arc<Mutex<Connection>>, key: &str) -> Result<Self> {
        let store = Self {
            conn,
            key: key.to_string(),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Use a different slot name in the same table.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    fn ensure_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS state_slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| WardenError::lock_poisoned("state"))
    }
}

impl RunStateStore for SqliteRunStateStore {
    fn load(&self) -> Result<Option<CheckingRun>> {
        let conn = self.lock_conn()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM state_slots WHERE name = ?1",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        match value {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, run: &CheckingRun) -> Result<()> {
        let json = serde_json::to_string(run)?;
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO state_slots (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![self.key, json, Utc::now().to_rfc3339()],
        )?;
        debug!("Saved {} ({})", self.key, run.status);
        Ok(())
    }
}
