//! In-process visited-set backend

use crate::crawler::JobId;
use crate::storage::traits::{StorageError, StorageResult, VisitedStore};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Visited sets held in memory, one `HashSet` per job
#[derive(Debug, Default)]
pub struct MemoryVisitedStore {
    jobs: Mutex<HashMap<JobId, HashSet<String>>>,
}

impl MemoryVisitedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<JobId, HashSet<String>>>> {
        self.jobs.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl VisitedStore for MemoryVisitedStore {
    fn contains(&self, job_id: &JobId, url: &str) -> StorageResult<bool> {
        Ok(self
            .lock()?
            .get(job_id)
            .is_some_and(|urls| urls.contains(url)))
    }

    fn insert(&self, job_id: &JobId, url: &str) -> StorageResult<()> {
        self.insert_if_absent(job_id, url)?;
        Ok(())
    }

    fn insert_if_absent(&self, job_id: &JobId, url: &str) -> StorageResult<bool> {
        Ok(self
            .lock()?
            .entry(*job_id)
            .or_default()
            .insert(url.to_string()))
    }

    fn count(&self, job_id: &JobId) -> StorageResult<usize> {
        Ok(self.lock()?.get(job_id).map_or(0, HashSet::len))
    }

    fn forget_job(&self, job_id: &JobId) -> StorageResult<()> {
        self.lock()?.remove(job_id);
        Ok(())
    }
}
