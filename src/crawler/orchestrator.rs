//! Crawl orchestrator - runs one crawl step end to end
//!
//! A step moves through:
//! depth check, dedup check, extension filter, progress event, fetch,
//! extract, rank and publish, fan-out.
//!
//! Each step is self-contained. Whatever goes wrong inside it (an error or a
//! panic) ends that step only and is logged; no other step notices.

use crate::config::CrawlerConfig;
use crate::crawler::{CrawlStep, Event, EventBus};
use crate::extract::{ContentExtractor, ContentKind};
use crate::fetch::PageFetcher;
use crate::ranking::RankingEngine;
use crate::state::{SkipReason, StepOutcome};
use crate::storage::{StorageResult, VisitedStore};
use crate::url::{has_skipped_extension, normalize, same_site};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// How a step ended and what it discovered
#[derive(Debug, Clone, PartialEq)]
pub struct StepReport {
    pub outcome: StepOutcome,

    /// Steps for same-site links, one hop deeper
    pub children: Vec<CrawlStep>,
}

impl StepReport {
    fn terminal(outcome: StepOutcome) -> Self {
        Self {
            outcome,
            children: Vec::new(),
        }
    }
}

/// Drives crawl steps through fetch, extraction and ranking
pub struct Orchestrator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ContentExtractor,
    ranking: Arc<RankingEngine>,
    visited: Arc<dyn VisitedStore>,
    events: Arc<EventBus>,
    max_links_per_page: usize,
    strict_dedup: bool,
    extract_pdf: bool,
}

impl Orchestrator {
    pub fn new(
        config: &CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
        ranking: Arc<RankingEngine>,
        visited: Arc<dyn VisitedStore>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            fetcher,
            extractor: ContentExtractor::new(),
            ranking,
            visited,
            events,
            max_links_per_page: config.max_links_per_page,
            strict_dedup: config.strict_dedup,
            extract_pdf: config.extract_pdf,
        }
    }

    pub fn visited(&self) -> &Arc<dyn VisitedStore> {
        &self.visited
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Runs one step; never fails and never panics outward
    ///
    /// # Returns
    ///
    /// The terminal state of the step and the child steps to schedule.
    pub async fn run_step(&self, step: &CrawlStep) -> StepReport {
        match AssertUnwindSafe(self.process(step)).catch_unwind().await {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                tracing::error!(job_id = %step.job_id, url = %step.url, "Crawl step failed: {}", e);
                StepReport::terminal(StepOutcome::Failed(e.to_string()))
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(job_id = %step.job_id, url = %step.url, "Crawl step panicked: {}", message);
                StepReport::terminal(StepOutcome::Failed(message))
            }
        }
    }

    async fn process(&self, step: &CrawlStep) -> crate::Result<StepReport> {
        if step.remaining_depth < 0 {
            return Ok(self.skip(step, SkipReason::DepthExhausted));
        }

        if !self.claim(step)? {
            return Ok(self.skip(step, SkipReason::AlreadyVisited));
        }

        if has_skipped_extension(&step.url) {
            return Ok(self.skip(step, SkipReason::SkippedExtension));
        }

        self.events.publish(Event::progress(step.job_id, &step.url));

        let fetched = match self.fetcher.fetch(&step.url).await {
            Some(fetched) if !fetched.content.is_empty() => fetched,
            _ => {
                tracing::warn!(job_id = %step.job_id, url = %step.url, "No content fetched");
                return Ok(StepReport::terminal(StepOutcome::NoContent));
            }
        };

        if fetched.kind == ContentKind::Pdf && !self.extract_pdf {
            tracing::debug!(job_id = %step.job_id, url = %step.url, "Discarding PDF response");
            return Ok(StepReport::terminal(StepOutcome::NoContent));
        }

        let extraction = self.extractor.extract(&fetched.content, fetched.kind);
        let title = extraction.title.as_deref().unwrap_or(&step.url);

        let findings = self
            .ranking
            .process_page(&step.url, title, &extraction.text, &step.keywords);
        for finding in &findings {
            self.events.publish(Event::result(step.job_id, finding));
        }

        let children = if step.remaining_depth > 0 {
            self.fan_out(step, &extraction.links)
        } else {
            Vec::new()
        };

        tracing::info!(
            job_id = %step.job_id,
            url = %step.url,
            depth = step.remaining_depth,
            findings = findings.len(),
            children = children.len(),
            "Crawled page"
        );

        Ok(StepReport {
            outcome: StepOutcome::Processed { findings },
            children,
        })
    }

    /// Records the step's URL as visited; false if it already was
    fn claim(&self, step: &CrawlStep) -> StorageResult<bool> {
        if self.strict_dedup {
            return self.visited.insert_if_absent(&step.job_id, &step.url);
        }

        // Check and insert are separate calls: two racing steps can both win
        if self.visited.contains(&step.job_id, &step.url)? {
            return Ok(false);
        }
        self.visited.insert(&step.job_id, &step.url)?;
        Ok(true)
    }

    fn skip(&self, step: &CrawlStep, reason: SkipReason) -> StepReport {
        tracing::debug!(job_id = %step.job_id, url = %step.url, "Skipping: {}", reason);
        StepReport::terminal(StepOutcome::Skipped(reason))
    }

    /// Turns the first links of a page into child steps
    ///
    /// Links are resolved against the page URL. Links back to the page
    /// itself and links leaving the site are dropped.
    fn fan_out(&self, step: &CrawlStep, links: &[String]) -> Vec<CrawlStep> {
        links
            .iter()
            .take(self.max_links_per_page)
            .filter_map(|link| match normalize(&step.url, link) {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::debug!(job_id = %step.job_id, "Dropping link {}: {}", link, e);
                    None
                }
            })
            .filter(|url| *url != step.url && same_site(&step.url, url))
            .map(|url| step.child(url))
            .collect()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
