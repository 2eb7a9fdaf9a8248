//! Crawler module - breadth-first crawl orchestration
//!
//! This module contains the core crawling logic, including:
//! - Jobs, crawl steps and their depth accounting
//! - The per-step pipeline (dedup, fetch, extract, rank, fan-out)
//! - Per-job event channels
//! - The worker pool that runs steps concurrently and detects job drain
//! - Request validation and submission

mod events;
mod orchestrator;
mod pool;
mod service;
mod step;

pub use events::{Event, EventBus, DEFAULT_CHANNEL_CAPACITY};
pub use orchestrator::{Orchestrator, StepReport};
pub use pool::WorkerPool;
pub use service::{CrawlRequest, CrawlService};
pub use step::{CrawlStep, JobId};
