//! Worker pool - dispatches queued crawl steps to concurrent workers
//!
//! Steps wait in an unbounded queue and run as tokio tasks, at most
//! `concurrency` at a time. Child steps go back into the same queue, so a
//! crawl is never recursive in-process.
//!
//! The pool also counts outstanding steps per job. A step's children are
//! counted before the step itself is marked finished, so the count only
//! reaches zero once the whole job has drained. At that point the pool
//! publishes `complete`, discards the job's visited set and closes its
//! event channel.

use crate::crawler::{CrawlStep, Event, JobId, Orchestrator};
use crate::{Result, ScoutError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;

/// Shared by the dispatcher and every running step
struct PoolContext {
    orchestrator: Arc<Orchestrator>,
    queue: mpsc::UnboundedSender<CrawlStep>,
    pending: Mutex<HashMap<JobId, usize>>,
}

impl PoolContext {
    fn enqueue(&self, step: CrawlStep) -> Result<()> {
        let job_id = step.job_id;
        self.adjust_pending(job_id, 1);

        if self.queue.send(step).is_err() {
            self.adjust_pending(job_id, -1);
            return Err(ScoutError::QueueClosed);
        }
        Ok(())
    }

    /// Marks one step of `job_id` finished, completing the job if it was the last
    fn finish(&self, job_id: JobId) {
        if self.adjust_pending(job_id, -1) == 0 {
            self.complete(job_id);
        }
    }

    fn adjust_pending(&self, job_id: JobId, delta: isize) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let count = pending.entry(job_id).or_insert(0);
        *count = count.saturating_add_signed(delta);
        let remaining = *count;
        if remaining == 0 {
            pending.remove(&job_id);
        }
        remaining
    }

    fn complete(&self, job_id: JobId) {
        let visited = self.orchestrator.visited();
        let pages_visited = visited.count(&job_id).unwrap_or_else(|e| {
            tracing::warn!(job_id = %job_id, "Could not count visited pages: {}", e);
            0
        });

        tracing::info!(job_id = %job_id, pages_visited, "Crawl job complete");

        let events = self.orchestrator.events();
        events.publish(Event::Complete {
            job_id,
            pages_visited,
        });
        events.close(&job_id);

        if let Err(e) = visited.forget_job(&job_id) {
            tracing::warn!(job_id = %job_id, "Could not discard visited set: {}", e);
        }
    }

    fn pending_jobs(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Concurrent executor for crawl steps
pub struct WorkerPool {
    context: Arc<PoolContext>,
    dispatcher: JoinHandle<()>,
}

impl WorkerPool {
    /// Starts the dispatcher on the current tokio runtime
    ///
    /// # Arguments
    ///
    /// * `orchestrator` - Runs each step
    /// * `concurrency` - Maximum steps in flight at once (at least 1)
    pub fn start(orchestrator: Arc<Orchestrator>, concurrency: usize) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        let context = Arc::new(PoolContext {
            orchestrator,
            queue,
            pending: Mutex::new(HashMap::new()),
        });
        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));

        let dispatcher = tokio::spawn(dispatch(receiver, Arc::clone(&context), semaphore));

        Self {
            context,
            dispatcher,
        }
    }

    /// Queues a step and counts it against its job
    pub fn enqueue(&self, step: CrawlStep) -> Result<()> {
        self.context.enqueue(step)
    }

    /// Number of jobs with steps still queued or running
    pub fn active_jobs(&self) -> usize {
        self.context.pending_jobs()
    }

    /// Stops dispatching; steps already running finish on their own
    pub fn shutdown(&self) {
        self.dispatcher.abort();
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.dispatcher.abort();
    }
}

async fn dispatch(
    mut receiver: mpsc::UnboundedReceiver<CrawlStep>,
    context: Arc<PoolContext>,
    semaphore: Arc<Semaphore>,
) {
    while let Some(step) = receiver.recv().await {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => break,
        };
        let context = Arc::clone(&context);

        tokio::spawn(async move {
            let report = context.orchestrator.run_step(&step).await;
            drop(permit);

            for child in report.children {
                if let Err(e) = context.enqueue(child) {
                    tracing::error!(job_id = %step.job_id, "Could not queue child step: {}", e);
                }
            }
            context.finish(step.job_id);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use crate::crawler::EventBus;
    use crate::extract::ContentKind;
    use crate::fetch::{FetchResult, PageFetcher};
    use crate::ranking::RankingEngine;
    use crate::storage::{MemoryVisitedStore, VisitedStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Every page links to `/a`, `/b` and `/c`
    struct MeshFetcher {
        fetches: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl PageFetcher for MeshFetcher {
        async fn fetch(&self, url: &str) -> Option<FetchResult> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let html = r#"<html><body>
                <p>Research scholarship opportunities for graduate students.</p>
                <a href="/a">A</a><a href="/b">B</a><a href="/c">C</a>
            </body></html>"#;
            Some(FetchResult {
                content: html.as_bytes().to_vec(),
                kind: ContentKind::Html,
                resolved_url: url.to_string(),
            })
        }
    }

    fn pool(concurrency: usize) -> (WorkerPool, Arc<MeshFetcher>, Arc<EventBus>, Arc<dyn VisitedStore>) {
        let fetcher = Arc::new(MeshFetcher {
            fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });
        let events = Arc::new(EventBus::default());
        let visited: Arc<dyn VisitedStore> = Arc::new(MemoryVisitedStore::new());
        let orchestrator = Orchestrator::new(
            &CrawlerConfig {
                strict_dedup: true,
                ..CrawlerConfig::default()
            },
            fetcher.clone(),
            Arc::new(RankingEngine::default()),
            Arc::clone(&visited),
            Arc::clone(&events),
        );
        let pool = WorkerPool::start(Arc::new(orchestrator), concurrency);
        (pool, fetcher, events, visited)
    }

    async fn wait_for_complete(
        rx: &mut tokio::sync::broadcast::Receiver<Event>,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        tokio::time::timeout(Duration::from_secs(10), async {
            while let Ok(event) = rx.recv().await {
                let done = event.is_complete();
                events.push(event);
                if done {
                    break;
                }
            }
        })
        .await
        .unwrap();
        events
    }

    #[tokio::test]
    async fn test_job_drains_and_completes() {
        let (pool, fetcher, events, visited) = pool(3);
        let job = JobId::new();
        let mut rx = events.open(job);

        pool.enqueue(CrawlStep::seed(
            "https://uni.example.edu".to_string(),
            job,
            vec!["scholarship".to_string()],
            2,
        ))
        .unwrap();

        let received = wait_for_complete(&mut rx).await;

        // Seed plus /a, /b, /c; every later link is already visited
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 4);
        assert_eq!(
            received.last(),
            Some(&Event::Complete {
                job_id: job,
                pages_visited: 4
            })
        );

        let progress = received
            .iter()
            .filter(|e| matches!(e, Event::Progress { .. }))
            .count();
        assert_eq!(progress, 4);

        assert_eq!(visited.count(&job).unwrap(), 0);
        assert_eq!(pool.active_jobs(), 0);
        assert_eq!(events.open_channels(), 0);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let (pool, fetcher, events, _visited) = pool(1);
        let job = JobId::new();
        let mut rx = events.open(job);

        pool.enqueue(CrawlStep::seed(
            "https://uni.example.edu".to_string(),
            job,
            vec!["scholarship".to_string()],
            1,
        ))
        .unwrap();
        wait_for_complete(&mut rx).await;

        assert_eq!(fetcher.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_depth_zero_job_completes_after_one_page() {
        let (pool, fetcher, events, _visited) = pool(5);
        let job = JobId::new();
        let mut rx = events.open(job);

        pool.enqueue(CrawlStep::seed(
            "https://uni.example.edu".to_string(),
            job,
            vec!["scholarship".to_string()],
            0,
        ))
        .unwrap();
        let received = wait_for_complete(&mut rx).await;

        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 1);
        assert!(received.last().is_some_and(Event::is_complete));
    }
}
