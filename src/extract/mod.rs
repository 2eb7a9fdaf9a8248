//! Content extraction for fetched pages
//!
//! Turns raw fetched bytes into clean paragraph text plus the outbound link
//! list, dispatching on the content kind:
//! - HTML: noise stripped, text from content-bearing elements only
//! - PDF: per-page text, never any links
//! - Anything else: empty
//!
//! Extraction never fails outward; every internal failure maps to an empty
//! result.

mod html;
mod pdf;

pub use html::extract_html;
pub use pdf::extract_pdf;

#[cfg(test)]
pub(crate) use pdf::sample_pdf;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between text blocks
///
/// The ranking engine splits extracted text on this exact string, so both
/// sides must agree on it.
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Format of fetched content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// Markup, from the HTTP phase or rendered by the browser
    Html,
    /// A PDF document
    Pdf,
    /// Anything the extractor does not understand
    Other,
}

impl ContentKind {
    /// Maps a `Content-Type` header value to a content kind
    ///
    /// # Examples
    ///
    /// ```
    /// use uni_scout::extract::ContentKind;
    ///
    /// assert_eq!(ContentKind::from_content_type("text/html; charset=utf-8"), ContentKind::Html);
    /// assert_eq!(ContentKind::from_content_type("application/pdf"), ContentKind::Pdf);
    /// assert_eq!(ContentKind::from_content_type("image/png"), ContentKind::Other);
    /// ```
    pub fn from_content_type(content_type: &str) -> Self {
        let lowered = content_type.to_lowercase();
        if lowered.contains("application/pdf") {
            Self::Pdf
        } else if lowered.contains("text/html") || lowered.contains("xhtml") {
            Self::Html
        } else {
            Self::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Pdf => "pdf",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Clean text and links extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Paragraph text, blocks separated by [`PARAGRAPH_SEPARATOR`]
    pub text: String,

    /// Raw href values, deduplicated, in document order
    pub links: Vec<String>,

    /// The `<title>` text, if the page had one
    pub title: Option<String>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.links.is_empty()
    }
}

/// Format-aware extractor
///
/// Stateless; one instance is shared by every crawl step.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts text and links from `content` according to `kind`
    ///
    /// HTML bytes are decoded as UTF-8 with invalid sequences replaced.
    pub fn extract(&self, content: &[u8], kind: ContentKind) -> ExtractionResult {
        match kind {
            ContentKind::Html => extract_html(&String::from_utf8_lossy(content)),
            ContentKind::Pdf => ExtractionResult {
                text: extract_pdf(content),
                links: Vec::new(),
                title: None,
            },
            ContentKind::Other => ExtractionResult::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_kind_from_header() {
        assert_eq!(
            ContentKind::from_content_type("TEXT/HTML"),
            ContentKind::Html
        );
        assert_eq!(
            ContentKind::from_content_type("application/xhtml+xml"),
            ContentKind::Html
        );
        assert_eq!(
            ContentKind::from_content_type("application/pdf; qs=0.001"),
            ContentKind::Pdf
        );
        assert_eq!(ContentKind::from_content_type(""), ContentKind::Other);
    }

    #[test]
    fn test_dispatch_html() {
        let extractor = ContentExtractor::new();
        let html = b"<html><body><p>A paragraph long enough to be extracted.</p><a href=\"/x\">x</a></body></html>";
        let result = extractor.extract(html, ContentKind::Html);
        assert_eq!(result.text, "A paragraph long enough to be extracted.");
        assert_eq!(result.links, vec!["/x"]);
    }

    #[test]
    fn test_dispatch_pdf_never_has_links() {
        let extractor = ContentExtractor::new();
        let result = extractor.extract(b"<a href=\"/x\">not really a pdf</a>", ContentKind::Pdf);
        assert!(result.links.is_empty());
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_dispatch_other_is_empty() {
        let extractor = ContentExtractor::new();
        let result = extractor.extract(b"\x89PNG\r\n", ContentKind::Other);
        assert!(result.is_empty());
        assert_eq!(result.title, None);
    }

    #[test]
    fn test_invalid_utf8_does_not_fail() {
        let extractor = ContentExtractor::new();
        let mut bytes = b"<html><body><p>Scholarships for international students \xff\xfe</p></body></html>".to_vec();
        bytes.push(0xC3);
        let result = extractor.extract(&bytes, ContentKind::Html);
        assert!(result.text.starts_with("Scholarships for international students"));
    }
}
