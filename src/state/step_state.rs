//! Terminal states of a single crawl step
//!
//! This module defines every way a step through the orchestrator can end.

use crate::ranking::Finding;
use std::fmt;

/// Why a step stopped before fetching anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The step arrived with a negative remaining depth
    DepthExhausted,

    /// The URL was already scheduled or fetched in this job
    AlreadyVisited,

    /// The URL ends in a binary or media file extension
    SkippedExtension,
}

impl SkipReason {
    /// Short snake_case label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepthExhausted => "depth_exhausted",
            Self::AlreadyVisited => "already_visited",
            Self::SkippedExtension => "skipped_extension",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a crawl step ended
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    // ===== Terminal Skip States =====
    /// No work was done
    Skipped(SkipReason),

    // ===== Terminal Success States =====
    /// The fetch gave nothing usable (no result, empty body, or a discarded PDF)
    NoContent,

    /// The page was extracted and ranked; `findings` were published
    Processed { findings: Vec<Finding> },

    // ===== Terminal Error States =====
    /// An unexpected failure (error or panic) ended the step
    Failed(String),
}

impl StepOutcome {
    /// Returns true if the step fetched and ranked a page
    pub fn is_processed(&self) -> bool {
        matches!(self, Self::Processed { .. })
    }

    /// Returns true if the step did no work at all
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns true if the step was cut short by an unexpected failure
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Findings published by this step (empty unless processed)
    pub fn findings(&self) -> &[Finding] {
        match self {
            Self::Processed { findings } => findings,
            _ => &[],
        }
    }

    /// Short snake_case label used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Skipped(_) => "skipped",
            Self::NoContent => "no_content",
            Self::Processed { .. } => "processed",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skipped(reason) => write!(f, "skipped ({})", reason),
            Self::Processed { findings } => write!(f, "processed ({} findings)", findings.len()),
            Self::Failed(message) => write!(f, "failed: {}", message),
            Self::NoContent => f.write_str(self.as_str()),
        }
    }
}
