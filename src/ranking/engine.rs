use super::Finding;
use crate::config::RankingConfig;
use crate::extract::PARAGRAPH_SEPARATOR;

/// Blocks shorter than this are fragments ("Menu", "Copyright"), not content
pub const MIN_BLOCK_CHARS: usize = 40;

/// Points for a block containing a keyword at all
pub const BASE_POINTS: f64 = 10.0;

/// Extra points when the keyword sits at the start of the block
pub const EARLY_PLACEMENT_POINTS: f64 = 5.0;

/// Width of the "start of the block" window, in characters
pub const EARLY_PLACEMENT_WINDOW: usize = 50;

/// Points per occurrence of a keyword
pub const DENSITY_POINTS: f64 = 2.0;

/// Occurrences beyond this many earn nothing
pub const DENSITY_CAP: usize = 5;

/// Maximum snippet length, in characters, before the ellipsis
pub const SNIPPET_CHARS: usize = 200;

/// Title used when the caller passes an empty one
pub const UNTITLED: &str = "Untitled Page";

/// Scores paragraph blocks against keywords and keeps the best few
///
/// The engine holds only its threshold and cap; it is immutable after
/// construction and shared behind an `Arc` by every worker.
#[derive(Debug, Clone, PartialEq)]
pub struct RankingEngine {
    min_score: f64,
    max_findings: usize,
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::new(&RankingConfig::default())
    }
}

impl RankingEngine {
    pub fn new(config: &RankingConfig) -> Self {
        Self {
            min_score: config.min_score,
            max_findings: config.max_findings,
        }
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    /// Ranks the blocks of one page
    ///
    /// # Scoring
    ///
    /// For each block of at least 40 characters, every non-empty keyword
    /// found in it (case-insensitive) adds:
    /// - 10 points for being present
    /// - 5 points if its first occurrence fits inside the first 50 characters
    /// - 2 points per occurrence, counting at most 5 occurrences
    ///
    /// Blocks under the threshold are dropped; the rest are sorted by score,
    /// highest first, ties kept in page order, and cut to the cap.
    ///
    /// # Arguments
    ///
    /// * `url` - URL of the page, copied onto every finding
    /// * `title` - Page title; an empty title becomes "Untitled Page"
    /// * `text` - Extracted text, blocks separated by a blank line
    /// * `keywords` - Caller keywords in priority order
    pub fn process_page(
        &self,
        url: &str,
        title: &str,
        text: &str,
        keywords: &[String],
    ) -> Vec<Finding> {
        if text.is_empty() || keywords.is_empty() {
            return Vec::new();
        }

        let title = if title.trim().is_empty() {
            UNTITLED
        } else {
            title
        };

        let mut findings: Vec<Finding> = text
            .split(PARAGRAPH_SEPARATOR)
            .map(str::trim)
            .filter(|block| block.chars().count() >= MIN_BLOCK_CHARS)
            .filter_map(|block| {
                let (score, keyword) = score_block(block, keywords)?;
                (score >= self.min_score).then(|| Finding {
                    keyword: keyword.to_string(),
                    score,
                    snippet: snippet(block),
                    url: url.to_string(),
                    title: title.to_string(),
                })
            })
            .collect();

        // sort_by is stable, so equal scores keep page order
        findings.sort_by(|a, b| b.score.total_cmp(&a.score));
        findings.truncate(self.max_findings);
        findings
    }
}

/// Scores one block, returning the score and the first matching keyword
///
/// Returns `None` when no keyword occurs in the block.
pub fn score_block<'k>(block: &str, keywords: &'k [String]) -> Option<(f64, &'k str)> {
    let block_lower = block.to_lowercase();
    let mut score = 0.0;
    let mut matched: Option<&'k str> = None;

    for keyword in keywords {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            continue;
        }

        let Some(first) = block_lower.find(&needle) else {
            continue;
        };

        score += BASE_POINTS;

        let end_chars = block_lower[..first].chars().count() + needle.chars().count();
        if end_chars <= EARLY_PLACEMENT_WINDOW {
            score += EARLY_PLACEMENT_POINTS;
        }

        let occurrences = block_lower.matches(needle.as_str()).count();
        score += occurrences.min(DENSITY_CAP) as f64 * DENSITY_POINTS;

        matched.get_or_insert(keyword.as_str());
    }

    matched.map(|keyword| (score, keyword))
}

/// Cuts a block to [`SNIPPET_CHARS`] characters, marking truncation with "..."
pub fn snippet(block: &str) -> String {
    match block.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &block[..cut]),
        None => block.to_string(),
    }
}
