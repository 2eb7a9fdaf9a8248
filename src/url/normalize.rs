use crate::UrlError;
use url::Url;

/// Resolves `link` against `base` and reduces the result to its canonical form
///
/// # Normalization Steps
///
/// 1. Parse `base`; reject if it is not an absolute URL
/// 2. Join `link` onto it (relative paths, `../`, protocol-relative links)
/// 3. Remove the query string (tracking parameters, session ids)
/// 4. Remove the fragment (in-page anchors)
/// 5. Remove trailing slashes, so `page/` and `page` collapse to one entry
///
/// Step 5 strips every trailing slash rather than just one; this keeps the
/// function idempotent for paths such as `/a//`.
///
/// # Arguments
///
/// * `base` - The absolute URL of the page the link was found on
/// * `link` - The raw `href` value, absolute or relative
///
/// # Returns
///
/// * `Ok(String)` - The normalized URL
/// * `Err(UrlError)` - `base` is not absolute or the join failed
///
/// # Examples
///
/// ```
/// use uni_scout::url::normalize;
///
/// let url = normalize("https://cs.example.edu/news/", "../apply/?utm_source=x#top").unwrap();
/// assert_eq!(url, "https://cs.example.edu/apply");
/// ```
pub fn normalize(base: &str, link: &str) -> Result<String, UrlError> {
    let base_url = Url::parse(base).map_err(|e| UrlError::Parse(e.to_string()))?;

    let mut joined = base_url.join(link.trim()).map_err(|e| UrlError::Join {
        base: base.to_string(),
        link: link.to_string(),
        message: e.to_string(),
    })?;

    joined.set_query(None);
    joined.set_fragment(None);

    Ok(joined.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://cs.example.edu/programs/phd";

    #[test]
    fn test_absolute_link_kept() {
        let result = normalize(BASE, "https://cs.example.edu/people").unwrap();
        assert_eq!(result, "https://cs.example.edu/people");
    }

    #[test]
    fn test_root_relative_link() {
        let result = normalize(BASE, "/admissions").unwrap();
        assert_eq!(result, "https://cs.example.edu/admissions");
    }

    #[test]
    fn test_path_relative_link() {
        let result = normalize(BASE, "funding").unwrap();
        assert_eq!(result, "https://cs.example.edu/programs/funding");
    }

    #[test]
    fn test_parent_relative_link() {
        let result = normalize(BASE, "../../research").unwrap();
        assert_eq!(result, "https://cs.example.edu/research");
    }

    #[test]
    fn test_protocol_relative_link() {
        let result = normalize(BASE, "//www.example.edu/about").unwrap();
        assert_eq!(result, "https://www.example.edu/about");
    }

    #[test]
    fn test_query_removed() {
        let result = normalize(BASE, "/news?page=2&utm_source=mail").unwrap();
        assert_eq!(result, "https://cs.example.edu/news");
    }

    #[test]
    fn test_fragment_removed() {
        let result = normalize(BASE, "/news#latest").unwrap();
        assert_eq!(result, "https://cs.example.edu/news");
    }

    #[test]
    fn test_trailing_slash_removed() {
        let result = normalize(BASE, "/news/").unwrap();
        assert_eq!(result, "https://cs.example.edu/news");
    }

    #[test]
    fn test_root_loses_slash() {
        let result = normalize("https://cs.example.edu", "/").unwrap();
        assert_eq!(result, "https://cs.example.edu");
    }

    #[test]
    fn test_repeated_trailing_slashes() {
        let result = normalize(BASE, "/a//").unwrap();
        assert_eq!(result, "https://cs.example.edu/a");
    }

    #[test]
    fn test_fragment_only_link_resolves_to_base() {
        let result = normalize(BASE, "#section").unwrap();
        assert_eq!(result, BASE);
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            ("https://cs.example.edu", "/"),
            (BASE, "../x/?q=1#f"),
            (BASE, "/a//"),
            ("https://www.example.edu/", "people/"),
            ("http://example.edu:8080/a/b", "c?d=e"),
        ];

        for (base, link) in inputs {
            let once = normalize(base, link).unwrap();
            let twice = normalize(&once, &once).unwrap();
            assert_eq!(once, twice, "normalize is not idempotent for {}", once);
        }
    }

    #[test]
    fn test_relative_base_rejected() {
        let result = normalize("not a url", "/page");
        assert!(matches!(result, Err(UrlError::Parse(_))));
    }
}
