//! Crawl jobs and the steps they are made of

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque identifier of one crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    /// Generates a fresh random job id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// One unit of crawl work: fetch `url` and, depth permitting, its links
///
/// `remaining_depth` is signed so that a step arriving below zero can be
/// recognised and ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStep {
    /// Normalized URL to fetch
    pub url: String,

    /// Job this step belongs to
    pub job_id: JobId,

    /// Keywords to rank the page against, shared by every step of the job
    pub keywords: Arc<[String]>,

    /// Hops still allowed below this page
    pub remaining_depth: i32,
}

impl CrawlStep {
    /// Creates the first step of a job
    pub fn seed(url: String, job_id: JobId, keywords: Vec<String>, depth: i32) -> Self {
        Self {
            url,
            job_id,
            keywords: keywords.into(),
            remaining_depth: depth,
        }
    }

    /// Creates the step for a link found on this step's page
    pub fn child(&self, url: String) -> Self {
        Self {
            url,
            job_id: self.job_id,
            keywords: Arc::clone(&self.keywords),
            remaining_depth: self.remaining_depth - 1,
        }
    }
}
