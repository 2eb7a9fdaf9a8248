//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the VisitedStore
//! trait. Several worker processes on one host can open the same file; WAL
//! mode lets their reads proceed while one of them writes.

use crate::crawler::JobId;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, VisitedStore};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// SQLite visited-set backend
pub struct SqliteVisitedStore {
    conn: Mutex<Connection>,
}

impl SqliteVisitedStore {
    /// Opens or creates the database at `path`
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteVisitedStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;
        conn.busy_timeout(Duration::from_secs(5))?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl VisitedStore for SqliteVisitedStore {
    fn contains(&self, job_id: &JobId, url: &str) -> StorageResult<bool> {
        let conn = self.lock()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM visited WHERE job_id = ?1 AND url = ?2",
                params![job_id.to_string(), url],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&self, job_id: &JobId, url: &str) -> StorageResult<()> {
        self.insert_if_absent(job_id, url)?;
        Ok(())
    }

    fn insert_if_absent(&self, job_id: &JobId, url: &str) -> StorageResult<bool> {
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO visited (job_id, url, visited_at) VALUES (?1, ?2, ?3)",
            params![job_id.to_string(), url, Utc::now().to_rfc3339()],
        )?;
        Ok(inserted == 1)
    }

    fn count(&self, job_id: &JobId) -> StorageResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM visited WHERE job_id = ?1",
            params![job_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn forget_job(&self, job_id: &JobId) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "DELETE FROM visited WHERE job_id = ?1",
            params![job_id.to_string()],
        )?;
        Ok(())
    }
}
