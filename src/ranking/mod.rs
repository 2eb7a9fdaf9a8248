//! Relevance ranking for extracted page text
//!
//! Splits a page into paragraph blocks, scores each against the job's
//! keywords, and keeps the highest scoring few. Pure computation: no I/O,
//! no shared state, never fails.

mod engine;

pub use engine::{score_block, snippet, RankingEngine, MIN_BLOCK_CHARS, UNTITLED};

use serde::{Deserialize, Serialize};

/// One relevant paragraph found on a page
///
/// Findings are ephemeral: built, published as an event, then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    /// First keyword (in caller order) that matched the block
    pub keyword: String,

    /// Relevance score
    pub score: f64,

    /// The block, cut to 200 characters plus "..." when longer
    pub snippet: String,

    /// Page the block came from
    pub url: String,

    /// Page title, or "Untitled Page"
    pub title: String,
}
