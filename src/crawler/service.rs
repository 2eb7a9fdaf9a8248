//! Crawl submission
//!
//! Turns a crawl request into a job id and a seed step on the worker pool.

use crate::config::Config;
use crate::crawler::{CrawlStep, Event, EventBus, JobId, Orchestrator, WorkerPool};
use crate::fetch::{HybridFetcher, PageFetcher};
use crate::ranking::RankingEngine;
use crate::storage::{open_store, VisitedStore};
use crate::url::normalize;
use crate::{Result, ScoutError};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast;

/// A request to crawl one site
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CrawlRequest {
    /// Seed URL, absolute http(s)
    pub url: String,

    /// Keywords in priority order; at least one must be non-blank
    pub keywords: Vec<String>,

    /// Maximum link depth below the seed; the configured default when absent
    #[serde(default)]
    pub depth: Option<i32>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>, keywords: Vec<String>) -> Self {
        Self {
            url: url.into(),
            keywords,
            depth: None,
        }
    }

    pub fn with_depth(mut self, depth: i32) -> Self {
        self.depth = Some(depth);
        self
    }
}

/// Entry point for starting crawl jobs and watching their events
pub struct CrawlService {
    pool: WorkerPool,
    events: Arc<EventBus>,
    default_depth: i32,
}

impl CrawlService {
    /// Builds the service with the fetcher and visited store the config names
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlService)` - Workers started
    /// * `Err(ScoutError)` - The HTTP client or the visited store could not be set up
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(HybridFetcher::new(&config.fetcher)?);
        let visited = open_store(&config.storage)?;
        Ok(Self::new(config, fetcher, visited))
    }

    /// Builds the service around a caller-supplied fetcher and visited store
    pub fn new(
        config: &Config,
        fetcher: Arc<dyn PageFetcher>,
        visited: Arc<dyn VisitedStore>,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let ranking = Arc::new(RankingEngine::new(&config.ranking));
        let orchestrator = Orchestrator::new(
            &config.crawler,
            fetcher,
            ranking,
            visited,
            Arc::clone(&events),
        );
        let pool = WorkerPool::start(Arc::new(orchestrator), config.crawler.concurrency as usize);

        Self {
            pool,
            events,
            default_depth: config.crawler.default_depth,
        }
    }

    /// Validates a request and schedules its seed step
    ///
    /// Events published before the caller subscribes are lost; use
    /// [`CrawlService::submit_and_subscribe`] to see every event.
    pub fn submit(&self, request: CrawlRequest) -> Result<JobId> {
        self.submit_and_subscribe(request).map(|(job_id, _)| job_id)
    }

    /// Like [`CrawlService::submit`], subscribing before the seed step is queued
    pub fn submit_and_subscribe(
        &self,
        request: CrawlRequest,
    ) -> Result<(JobId, broadcast::Receiver<Event>)> {
        let seed = self.seed_step(request, JobId::new())?;
        let job_id = seed.job_id;
        let receiver = self.events.open(job_id);

        if let Err(e) = self.schedule(seed) {
            self.events.close(&job_id);
            return Err(e);
        }
        Ok((job_id, receiver))
    }

    /// Subscribes to a running job's live events
    ///
    /// Returns `None` once the job has completed, or if it never existed.
    pub fn subscribe(&self, job_id: JobId) -> Option<broadcast::Receiver<Event>> {
        self.events.subscribe(job_id)
    }

    /// Number of jobs still running
    pub fn active_jobs(&self) -> usize {
        self.pool.active_jobs()
    }

    /// Stops dispatching further steps
    pub fn shutdown(&self) {
        self.pool.shutdown();
    }

    fn seed_step(&self, request: CrawlRequest, job_id: JobId) -> Result<CrawlStep> {
        let keywords: Vec<String> = request
            .keywords
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();
        if keywords.is_empty() {
            return Err(ScoutError::InvalidRequest(
                "at least one keyword is required".to_string(),
            ));
        }

        let depth = request.depth.unwrap_or(self.default_depth);
        if depth < 0 {
            return Err(ScoutError::InvalidRequest(format!(
                "depth must not be negative (got {depth})"
            )));
        }

        let parsed = ::url::Url::parse(request.url.trim())?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScoutError::InvalidRequest(format!(
                "unsupported URL scheme '{}'",
                parsed.scheme()
            )));
        }
        let url = normalize(parsed.as_str(), parsed.as_str())?;

        Ok(CrawlStep::seed(url, job_id, keywords, depth))
    }

    fn schedule(&self, seed: CrawlStep) -> Result<()> {
        tracing::info!(
            job_id = %seed.job_id,
            url = %seed.url,
            depth = seed.remaining_depth,
            keywords = ?seed.keywords,
            "Crawl job submitted"
        );
        self.pool.enqueue(seed)
    }
}
