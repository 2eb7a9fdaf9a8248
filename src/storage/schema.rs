//! Database schema definitions
//!
//! This module contains the SQL schema for the shared visited-set database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per URL scheduled or fetched within a job
CREATE TABLE IF NOT EXISTS visited (
    job_id TEXT NOT NULL,
    url TEXT NOT NULL,
    visited_at TEXT NOT NULL,
    PRIMARY KEY (job_id, url)
);

CREATE INDEX IF NOT EXISTS idx_visited_job ON visited(job_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
