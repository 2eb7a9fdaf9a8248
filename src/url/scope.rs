use super::domain::domain;

/// Decides whether `target_url` belongs to the same institution as `source_url`
///
/// Both hosts lose a leading `www.` first. They are then same-site when:
/// 1. They are equal: `example.edu` and `www.example.edu`
/// 2. The target is a subdomain of the source: `cs.example.edu` under `example.edu`
/// 3. The source is a subdomain of the target: crawling `cs.example.edu` and
///    finding a link back to `example.edu`
///
/// Subdomain matching requires a dot boundary, so `notexample.edu` is never
/// treated as part of `example.edu`. URLs without a host are never same-site.
///
/// # Examples
///
/// ```
/// use uni_scout::url::same_site;
///
/// assert!(same_site("https://example.edu/", "https://cs.example.edu/people"));
/// assert!(same_site("https://cs.example.edu/", "https://www.example.edu/"));
/// assert!(!same_site("https://example.edu/", "https://example.com/"));
/// ```
pub fn same_site(source_url: &str, target_url: &str) -> bool {
    let source_host = domain(source_url);
    let target_host = domain(target_url);

    let source = strip_www(&source_host);
    let target = strip_www(&target_host);

    if source.is_empty() || target.is_empty() {
        return false;
    }

    source == target || is_subdomain_of(target, source) || is_subdomain_of(source, target)
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

fn is_subdomain_of(candidate: &str, parent: &str) -> bool {
    candidate
        .strip_suffix(parent)
        .is_some_and(|prefix| prefix.ends_with('.'))
}
