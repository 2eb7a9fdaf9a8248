//! Uni-Scout: a keyword scout for university websites
//!
//! This crate crawls one site breadth-first from a seed URL, scores the text
//! of every page it reaches against caller-supplied keywords, and streams the
//! best matching paragraphs to subscribers as they are found.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod fetch;
pub mod ranking;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Uni-Scout operations
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Invalid crawl request: {0}")]
    InvalidRequest(String),

    #[error("Step queue closed")]
    QueueClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Cannot resolve '{link}' against '{base}': {message}")]
    Join {
        base: String,
        link: String,
        message: String,
    },
}

/// Result type alias for Uni-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlRequest, CrawlService, CrawlStep, Event, JobId};
pub use ranking::{Finding, RankingEngine};
pub use url::{domain, normalize, same_site};
