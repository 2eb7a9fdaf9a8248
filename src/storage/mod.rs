//! Storage module for the per-job visited sets
//!
//! The visited set is the only state crawl steps share. This module provides:
//! - The `VisitedStore` trait the orchestrator works against
//! - An in-memory backend for single-process crawls
//! - A SQLite backend that several worker processes can share

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryVisitedStore;
pub use sqlite::SqliteVisitedStore;
pub use traits::{StorageError, StorageResult, VisitedStore};

use crate::config::{StorageBackend, StorageConfig};
use std::path::Path;
use std::sync::Arc;

/// Opens the visited-set backend named by the configuration
///
/// # Returns
///
/// * `Ok(Arc<dyn VisitedStore>)` - Ready to share between workers
/// * `Err(StorageError)` - The SQLite database could not be opened
pub fn open_store(config: &StorageConfig) -> StorageResult<Arc<dyn VisitedStore>> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryVisitedStore::new())),
        StorageBackend::Sqlite => {
            tracing::info!("Opening visited-set database at {}", config.database_path);
            let store = SqliteVisitedStore::new(Path::new(&config.database_path))?;
            Ok(Arc::new(store))
        }
    }
}
