//! URL handling module for Uni-Scout
//!
//! This module provides URL normalization, network-location extraction,
//! same-site scoping, and the file-extension filter applied before fetching.

mod domain;
mod normalize;
mod scope;

// Re-export main functions
pub use domain::domain;
pub use normalize::normalize;
pub use scope::same_site;

/// File extensions that never lead to a crawlable text page
///
/// Documents, archives and media are skipped before fetching.
pub const SKIPPED_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".zip", ".rar", ".tar", ".gz",
    ".jpg", ".jpeg", ".png", ".gif", ".svg", ".mp4", ".mp3",
];

/// Returns true if the URL ends with one of [`SKIPPED_EXTENSIONS`]
///
/// The comparison is case-insensitive and runs on the whole URL string, so
/// it should be given a normalized URL (no query or fragment).
///
/// # Examples
///
/// ```
/// use uni_scout::url::has_skipped_extension;
///
/// assert!(has_skipped_extension("https://example.edu/brochure.PDF"));
/// assert!(!has_skipped_extension("https://example.edu/programs"));
/// ```
pub fn has_skipped_extension(url: &str) -> bool {
    let lowered = url.to_lowercase();
    SKIPPED_EXTENSIONS
        .iter()
        .any(|extension| lowered.ends_with(extension))
}
