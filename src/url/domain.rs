use url::Url;

/// Extracts the network location (`host[:port]`) from a URL string
///
/// Hosts come back lowercase because the URL parser normalizes them. A
/// non-default port is kept, so two services on different ports of the same
/// machine are different locations.
///
/// # Arguments
///
/// * `url` - The URL to extract the location from
///
/// # Returns
///
/// The network location, or an empty string if the URL cannot be parsed or
/// has no host.
///
/// # Examples
///
/// ```
/// use uni_scout::url::domain;
///
/// assert_eq!(domain("https://www.cs.example.edu/news"), "www.cs.example.edu");
/// assert_eq!(domain("http://localhost:8080/"), "localhost:8080");
/// assert_eq!(domain("not a url"), "");
/// ```
pub fn domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };

    match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{}:{}", host, port),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    }
}
