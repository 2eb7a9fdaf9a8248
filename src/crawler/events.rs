//! Per-job event channels
//!
//! Crawl steps publish progress and results as they happen. Delivery is
//! fire-and-forget: each subscriber sees an event at most once, nothing is
//! replayed for late subscribers, and a subscriber that falls too far behind
//! skips the events it missed.

use crate::crawler::JobId;
use crate::ranking::Finding;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Events buffered per job before slow subscribers start lagging
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// A message published on a job's channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A step has started fetching `url`
    Progress { job_id: JobId, url: String },

    /// A relevant paragraph was found
    Result {
        job_id: JobId,
        url: String,
        title: String,
        snippet: String,
        matched_keywords: Vec<String>,
        score: f64,
        /// Local wall-clock time, `HH:MM:SS`
        timestamp: String,
    },

    /// A job-level failure
    Error { job_id: JobId, message: String },

    /// Every step of the job has finished
    Complete { job_id: JobId, pages_visited: usize },
}

impl Event {
    pub fn progress(job_id: JobId, url: &str) -> Self {
        Self::Progress {
            job_id,
            url: url.to_string(),
        }
    }

    /// Builds a result event stamped with the current local time
    pub fn result(job_id: JobId, finding: &Finding) -> Self {
        Self::Result {
            job_id,
            url: finding.url.clone(),
            title: finding.title.clone(),
            snippet: finding.snippet.clone(),
            matched_keywords: vec![finding.keyword.clone()],
            score: finding.score,
            timestamp: Local::now().format("%H:%M:%S").to_string(),
        }
    }

    pub fn job_id(&self) -> JobId {
        match self {
            Self::Progress { job_id, .. }
            | Self::Result { job_id, .. }
            | Self::Error { job_id, .. }
            | Self::Complete { job_id, .. } => *job_id,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete { .. })
    }

    /// Encodes the event as a single-line JSON object
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Broadcast channels keyed by job id
#[derive(Debug)]
pub struct EventBus {
    channels: Mutex<HashMap<JobId, broadcast::Sender<Event>>>,
    capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn channels(&self) -> MutexGuard<'_, HashMap<JobId, broadcast::Sender<Event>>> {
        // The map is never left half-updated, so a poisoned lock is still usable
        self.channels.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Opens a job's channel, or joins it if already open
    ///
    /// Called when a job is submitted. The channel lives until [`close`].
    ///
    /// [`close`]: EventBus::close
    pub fn open(&self, job_id: JobId) -> broadcast::Receiver<Event> {
        self.channels()
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Subscribes to a running job's events
    ///
    /// Returns `None` for unknown jobs and jobs that have already completed;
    /// no channel is created for them.
    pub fn subscribe(&self, job_id: JobId) -> Option<broadcast::Receiver<Event>> {
        self.channels().get(&job_id).map(broadcast::Sender::subscribe)
    }

    /// Publishes an event on its job's channel
    ///
    /// Returns the number of subscribers that will see it. Events for a job
    /// nobody subscribed to are dropped.
    pub fn publish(&self, event: Event) -> usize {
        let channels = self.channels();
        match channels.get(&event.job_id()) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// Closes a job's channel; subscribers drain what is buffered, then see it closed
    pub fn close(&self, job_id: &JobId) {
        self.channels().remove(job_id);
    }

    /// Number of jobs with an open channel
    pub fn open_channels(&self) -> usize {
        self.channels().len()
    }
}
