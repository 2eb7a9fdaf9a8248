//! Storage traits and error types
//!
//! This module defines the trait interface for visited-set backends and
//! associated error types.

use crate::crawler::JobId;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Per-job set of URLs already scheduled or fetched
///
/// The set for a job only ever grows while the job is live, and is dropped
/// with [`VisitedStore::forget_job`] once the job drains. Implementations
/// must be safe to share between concurrently running crawl steps.
///
/// `contains` followed by `insert` is not atomic: two steps racing on the
/// same URL can both see it as new. `insert_if_absent` is the atomic
/// alternative.
pub trait VisitedStore: Send + Sync {
    /// Returns true if `url` was already recorded for `job_id`
    fn contains(&self, job_id: &JobId, url: &str) -> StorageResult<bool>;

    /// Records `url` for `job_id`; recording a known URL is a no-op
    fn insert(&self, job_id: &JobId, url: &str) -> StorageResult<()>;

    /// Records `url` only if absent, atomically
    ///
    /// Returns true if this call inserted it.
    fn insert_if_absent(&self, job_id: &JobId, url: &str) -> StorageResult<bool>;

    /// Number of URLs recorded for `job_id`
    fn count(&self, job_id: &JobId) -> StorageResult<usize>;

    /// Discards the whole set for `job_id`
    fn forget_job(&self, job_id: &JobId) -> StorageResult<()>;
}
