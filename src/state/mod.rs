//! State module for crawl step outcomes
//!
//! Every crawl step ends in exactly one terminal state. Skipped and failed
//! steps still count as done for job-drain accounting.
//!
//! # Components
//!
//! - `StepOutcome`: how a step ended (skipped, no content, processed, failed)
//! - `SkipReason`: why a step did no work

mod step_state;

pub use step_state::{SkipReason, StepOutcome};
