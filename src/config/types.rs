use serde::Deserialize;

/// Main configuration structure for Uni-Scout
///
/// Every section has defaults, so an empty file (or no file) is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Crawl orchestration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum number of crawl steps running at once
    pub concurrency: u32,

    /// Depth used when a request does not name one
    #[serde(rename = "default-depth")]
    pub default_depth: i32,

    /// Links taken from each page for fan-out
    #[serde(rename = "max-links-per-page")]
    pub max_links_per_page: usize,

    /// Use an atomic insert-if-absent for the visited set instead of check-then-insert
    #[serde(rename = "strict-dedup")]
    pub strict_dedup: bool,

    /// Run extraction and ranking on PDF results instead of discarding them
    #[serde(rename = "extract-pdf")]
    pub extract_pdf: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            default_depth: 2,
            max_links_per_page: 15,
            strict_dedup: false,
            extract_pdf: false,
        }
    }
}

/// Hybrid fetcher deadlines and heuristics
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Total deadline for the plain HTTP request (milliseconds)
    #[serde(rename = "http-timeout-ms")]
    pub http_timeout_ms: u64,

    /// Deadline for browser navigation (milliseconds)
    #[serde(rename = "navigation-timeout-ms")]
    pub navigation_timeout_ms: u64,

    /// Pause after scrolling for lazy content (milliseconds)
    #[serde(rename = "settle-ms")]
    pub settle_ms: u64,

    /// Markup at or below this many characters is treated as a script shell
    #[serde(rename = "min-html-length")]
    pub min_html_length: usize,

    /// Fall back to a headless browser when the HTTP phase is not enough
    #[serde(rename = "browser-fallback")]
    pub browser_fallback: bool,

    /// Substrings marking an empty client-rendered application shell
    #[serde(rename = "shell-markers")]
    pub shell_markers: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            http_timeout_ms: 5000,
            navigation_timeout_ms: 5000,
            settle_ms: 500,
            min_html_length: 2000,
            browser_fallback: true,
            shell_markers: vec![r#"<div id="root"></div>"#.to_string()],
        }
    }
}

/// Ranking engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    /// Blocks scoring below this are discarded
    #[serde(rename = "min-score")]
    pub min_score: f64,

    /// Findings kept per page
    #[serde(rename = "max-findings")]
    pub max_findings: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            min_score: 10.0,
            max_findings: 3,
        }
    }
}

/// Where the per-job visited sets live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// In-process; only this process's workers share it
    #[default]
    Memory,
    /// SQLite file; shareable by several worker processes on one host
    Sqlite,
}

/// Visited-set storage configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Path to the SQLite database file (sqlite backend only)
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            database_path: "./visited.db".to_string(),
        }
    }
}
