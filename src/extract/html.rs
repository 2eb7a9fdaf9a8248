//! HTML extraction: noise stripping, link collection, and paragraph text
//!
//! Markup is parsed with `scraper`, boilerplate subtrees are detached from
//! the tree, and only content-bearing elements contribute text. Every query
//! walks down from the root element, since `Html::select` also visits
//! detached nodes still held in the arena.

use super::{ExtractionResult, PARAGRAPH_SEPARATOR};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

/// Elements and class markers whose whole subtree is navigation or chrome
const NOISE_SELECTOR: &str = "script, style, nav, footer, header, aside, .ad, .cookie, .banner";

/// Elements that carry readable content
const CONTENT_SELECTOR: &str = "h1, h2, h3, h4, p, li, article, section";

/// Fragments this short are menu labels, dates, and share buttons
const MIN_FRAGMENT_CHARS: usize = 20;

/// href prefixes that never lead to a crawlable page
const IGNORED_HREF_PREFIXES: &[&str] = &["#", "javascript:", "mailto:", "tel:"];

/// Extracts title, outbound links, and paragraph text from an HTML document
///
/// # Extraction Rules
///
/// 1. Capture the `<title>` text
/// 2. Detach every subtree matching [`NOISE_SELECTOR`]
/// 3. Collect `a[href]` values, skipping anchors and non-HTTP targets
/// 4. If the body has no text left, stop with empty text (links are kept)
/// 5. Take the text of every [`CONTENT_SELECTOR`] element, drop fragments of
///    20 characters or fewer, and join the rest with a blank line
pub fn extract_html(html: &str) -> ExtractionResult {
    let mut document = Html::parse_document(html);

    let title = extract_title(&document);

    remove_noise(&mut document);

    let links = extract_links(&document);

    if !has_body_content(&document) {
        return ExtractionResult {
            text: String::new(),
            links,
            title,
        };
    }

    let text = extract_text(&document);

    ExtractionResult { text, links, title }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .root_element()
        .select(&title_selector)
        .next()
        .map(collapse_whitespace)
        .filter(|s| !s.is_empty())
}

/// Detaches noise subtrees so neither their text nor their links survive
fn remove_noise(document: &mut Html) {
    let Ok(noise_selector) = Selector::parse(NOISE_SELECTOR) else {
        return;
    };

    let noise_ids: Vec<_> = document
        .root_element()
        .select(&noise_selector)
        .map(|element| element.id())
        .collect();

    for id in noise_ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

/// Collects distinct href values in document order
fn extract_links(document: &Html) -> Vec<String> {
    let Ok(a_selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.root_element().select(&a_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        if href.is_empty() || is_ignored_href(href) {
            continue;
        }

        if seen.insert(href.to_string()) {
            links.push(href.to_string());
        }
    }

    links
}

fn is_ignored_href(href: &str) -> bool {
    IGNORED_HREF_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

fn has_body_content(document: &Html) -> bool {
    let Ok(body_selector) = Selector::parse("body") else {
        return false;
    };

    document
        .root_element()
        .select(&body_selector)
        .next()
        .is_some_and(|body| body.text().any(|t| !t.trim().is_empty()))
}

fn extract_text(document: &Html) -> String {
    let Ok(content_selector) = Selector::parse(CONTENT_SELECTOR) else {
        return String::new();
    };

    document
        .root_element()
        .select(&content_selector)
        .map(collapse_whitespace)
        .filter(|fragment| fragment.chars().count() > MIN_FRAGMENT_CHARS)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

/// Joins an element's descendant text with runs of whitespace collapsed
fn collapse_whitespace(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let html = r#"<html><head><title>  Graduate   Study </title></head><body></body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.title, Some("Graduate Study".to_string()));
    }

    #[test]
    fn test_paragraph_text_joined_with_blank_line() {
        let html = r#"<html><body>
            <h1>Doctoral programs in computer science</h1>
            <p>Applications for the PhD program open in September.</p>
        </body></html>"#;
        let result = extract_html(html);
        assert_eq!(
            result.text,
            "Doctoral programs in computer science\n\nApplications for the PhD program open in September."
        );
    }

    #[test]
    fn test_short_fragments_dropped() {
        let html = r#"<html><body>
            <p>Share</p>
            <li>12 March 2025</li>
            <p>This paragraph is long enough to be kept.</p>
        </body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.text, "This paragraph is long enough to be kept.");
    }

    #[test]
    fn test_exactly_twenty_chars_dropped() {
        let html = r#"<html><body><p>abcdefghijklmnopqrst</p></body></html>"#;
        let result = extract_html(html);
        assert!(result.text.is_empty());
    }

    #[test]
    fn test_noise_text_removed() {
        let html = r#"<html><body>
            <header><p>Header paragraph that is long enough to count</p></header>
            <nav><li>Navigation entry that is long enough to count</li></nav>
            <div class="cookie"><p>We use cookies to improve your experience here</p></div>
            <div class="banner ad"><p>Advertising copy that is long enough to count</p></div>
            <script>var x = "a script body that should never be seen";</script>
            <p>The only paragraph that should survive extraction.</p>
            <footer><p>Footer paragraph that is long enough to count</p></footer>
        </body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.text, "The only paragraph that should survive extraction.");
    }

    #[test]
    fn test_links_collected() {
        let html = r#"<html><body>
            <a href="/admissions">Admissions</a>
            <a href="https://other.edu/">Elsewhere</a>
        </body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.links, vec!["/admissions", "https://other.edu/"]);
    }

    #[test]
    fn test_non_navigable_links_skipped() {
        let html = r##"<html><body>
            <a href="#top">Top</a>
            <a href="javascript:void(0)">Menu</a>
            <a href="mailto:grad@example.edu">Email</a>
            <a href="tel:+15551234">Call</a>
            <a href="">Empty</a>
            <a>No href</a>
            <a href="/kept">Kept</a>
        </body></html>"##;
        let result = extract_html(html);
        assert_eq!(result.links, vec!["/kept"]);
    }

    #[test]
    fn test_duplicate_links_collapsed() {
        let html = r#"<html><body>
            <a href="/a">A</a><a href="/b">B</a><a href="/a">A again</a>
        </body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.links, vec!["/a", "/b"]);
    }

    #[test]
    fn test_links_inside_noise_dropped() {
        let html = r#"<html><body>
            <nav><a href="/menu-item">Menu</a></nav>
            <main><a href="/content-link">Content</a></main>
        </body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.links, vec!["/content-link"]);
    }

    #[test]
    fn test_paragraphs_and_links_inside_nav_dropped() {
        let html = r#"<body><nav><p>Navigation paragraph that is long enough</p><a href="/menu">M</a></nav><p>Real content paragraph that should stay.</p></body>"#;
        let result = extract_html(html);
        assert_eq!(result.text, "Real content paragraph that should stay.");
        assert!(result.links.is_empty());
    }

    #[test]
    fn test_empty_body_keeps_links() {
        let html = r#"<html><body>
            <nav><p>Only navigation text lives on this page</p></nav>
            <a href="/next"></a>
        </body></html>"#;
        let result = extract_html(html);
        assert!(result.text.is_empty());
        assert_eq!(result.links, vec!["/next"]);
    }

    #[test]
    fn test_inline_markup_joined_with_spaces() {
        let html = r#"<html><body><p>Fully <b>funded</b> positions for <em>PhD</em> students</p></body></html>"#;
        let result = extract_html(html);
        assert_eq!(result.text, "Fully funded positions for PhD students");
    }
}
