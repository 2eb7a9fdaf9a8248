//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run whole crawl
//! jobs end-to-end through the real HTTP fetcher. The browser phase is
//! switched off so no Chromium is needed.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::broadcast;
use uni_scout::config::{Config, StorageBackend};
use uni_scout::fetch::HybridFetcher;
use uni_scout::storage::{open_store, VisitedStore};
use uni_scout::{CrawlRequest, CrawlService, Event};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration that never launches a browser
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.fetcher.browser_fallback = false;
    config.fetcher.http_timeout_ms = 2000;
    config
}

/// Wraps body markup in a page long enough to pass the HTTP phase
fn page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body>{}<!-- {} --></body></html>",
        title,
        body,
        "padding ".repeat(300)
    )
}

async fn mount_page(server: &MockServer, route: &str, html: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(html),
        )
        .expect(expected_hits)
        .mount(server)
        .await;
}

fn start_service(config: &Config) -> (CrawlService, Arc<dyn VisitedStore>) {
    let fetcher = Arc::new(HybridFetcher::new(&config.fetcher).expect("Failed to build fetcher"));
    let visited = open_store(&config.storage).expect("Failed to open visited store");
    let service = CrawlService::new(config, fetcher, Arc::clone(&visited));
    (service, visited)
}

/// Collects events until the job completes
async fn collect_events(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    tokio::time::timeout(Duration::from_secs(20), async {
        while let Ok(event) = rx.recv().await {
            let done = event.is_complete();
            events.push(event);
            if done {
                break;
            }
        }
    })
    .await
    .expect("Crawl job did not complete in time");
    events
}

fn progress_urls(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Progress { url, .. } => Some(url.clone()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_crawl_finds_keyword_and_stays_on_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        page(
            "Computer Science",
            r#"<p>Apply now for our PhD program starting fall 2025...</p>
               <a href="/admissions">Admissions</a>
               <a href="https://www.mit.edu/phd">Elsewhere</a>"#,
        ),
        1,
    )
    .await;
    mount_page(
        &mock_server,
        "/admissions",
        page(
            "Admissions",
            "<p>Deadlines and requirements are listed on the graduate school site.</p>",
        ),
        1,
    )
    .await;

    let (service, _visited) = start_service(&create_test_config());
    let (job_id, mut rx) = service
        .submit_and_subscribe(
            CrawlRequest::new(format!("{}/", base_url), vec!["PhD".to_string()]).with_depth(1),
        )
        .expect("Failed to submit crawl");

    let events = collect_events(&mut rx).await;

    assert_eq!(
        progress_urls(&events),
        vec![base_url.clone(), format!("{}/admissions", base_url)]
    );

    let results: Vec<&Event> = events
        .iter()
        .filter(|e| matches!(e, Event::Result { .. }))
        .collect();
    assert_eq!(results.len(), 1);
    match results[0] {
        Event::Result {
            url,
            title,
            matched_keywords,
            score,
            ..
        } => {
            assert_eq!(url, &base_url);
            assert_eq!(title, "Computer Science");
            assert_eq!(matched_keywords, &vec!["PhD".to_string()]);
            assert!(*score >= 10.0);
        }
        _ => unreachable!(),
    }

    assert_eq!(
        events.last(),
        Some(&Event::Complete {
            job_id,
            pages_visited: 2
        })
    );
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", page("Root", r#"<a href="/a">A</a>"#), 1).await;
    mount_page(&mock_server, "/a", page("A", r#"<a href="/b">B</a>"#), 1).await;
    mount_page(&mock_server, "/b", page("B", r#"<a href="/c">C</a>"#), 1).await;
    // Three hops below the seed: never reached with depth 2
    mount_page(&mock_server, "/c", page("C", ""), 0).await;

    let (service, _visited) = start_service(&create_test_config());
    let (_job_id, mut rx) = service
        .submit_and_subscribe(
            CrawlRequest::new(mock_server.uri(), vec!["scholarship".to_string()]).with_depth(2),
        )
        .expect("Failed to submit crawl");

    let events = collect_events(&mut rx).await;

    assert_eq!(progress_urls(&events).len(), 3);
    assert!(matches!(
        events.last(),
        Some(Event::Complete {
            pages_visited: 3,
            ..
        })
    ));
}

#[tokio::test]
async fn test_crawl_visits_each_page_once() {
    let mock_server = MockServer::start().await;
    let links = r#"<a href="/">Home</a><a href="/a">A</a><a href="/b">B</a><a href="/a#top">A again</a>"#;

    mount_page(&mock_server, "/", page("Home", links), 1).await;
    mount_page(&mock_server, "/a", page("A", links), 1).await;
    mount_page(&mock_server, "/b", page("B", links), 1).await;

    let mut config = create_test_config();
    config.crawler.strict_dedup = true;

    let (service, _visited) = start_service(&config);
    let (_job_id, mut rx) = service
        .submit_and_subscribe(
            CrawlRequest::new(mock_server.uri(), vec!["scholarship".to_string()]).with_depth(3),
        )
        .expect("Failed to submit crawl");

    let events = collect_events(&mut rx).await;

    let mut urls = progress_urls(&events);
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 3);
    assert_eq!(progress_urls(&events).len(), 3);
}

#[tokio::test]
async fn test_script_shell_without_browser_yields_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html")
                .set_body_string(
                    r#"<html><body><div id="root"></div><script src="/app.js"></script></body></html>"#,
                ),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let (service, _visited) = start_service(&create_test_config());
    let (_job_id, mut rx) = service
        .submit_and_subscribe(CrawlRequest::new(mock_server.uri(), vec!["PhD".to_string()]))
        .expect("Failed to submit crawl");

    let events = collect_events(&mut rx).await;

    assert_eq!(events.len(), 2);
    assert!(matches!(events[0], Event::Progress { .. }));
    assert!(events[1].is_complete());
}

#[tokio::test]
async fn test_content_type_handling() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        page(
            "Library",
            r#"<p>The PhD handbook is available as a download below.</p>
               <a href="/handbook">Handbook</a>
               <a href="/campus.jpg">Campus photo</a>"#,
        ),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/handbook"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.4 not really a pdf".to_vec()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/campus.jpg", String::new(), 0).await;

    let (service, _visited) = start_service(&create_test_config());
    let (_job_id, mut rx) = service
        .submit_and_subscribe(CrawlRequest::new(mock_server.uri(), vec!["PhD".to_string()]).with_depth(1))
        .expect("Failed to submit crawl");

    let events = collect_events(&mut rx).await;

    // The image is filtered before fetching; the PDF is fetched then discarded
    let results = events
        .iter()
        .filter(|e| matches!(e, Event::Result { .. }))
        .count();
    assert_eq!(results, 1);
    assert_eq!(progress_urls(&events).len(), 2);
    assert!(matches!(
        events.last(),
        Some(Event::Complete {
            pages_visited: 3,
            ..
        })
    ));
}

#[tokio::test]
async fn test_sqlite_visited_store_is_released_on_completion() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        page("Home", r#"<a href="/news">News</a>"#),
        1,
    )
    .await;
    mount_page(&mock_server, "/news", page("News", ""), 1).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = create_test_config();
    config.storage.backend = StorageBackend::Sqlite;
    config.storage.database_path = temp_dir
        .path()
        .join("visited.db")
        .to_string_lossy()
        .into_owned();

    let (service, visited) = start_service(&config);
    let (job_id, mut rx) = service
        .submit_and_subscribe(CrawlRequest::new(mock_server.uri(), vec!["PhD".to_string()]))
        .expect("Failed to submit crawl");

    let events = collect_events(&mut rx).await;

    assert!(matches!(
        events.last(),
        Some(Event::Complete {
            pages_visited: 2,
            ..
        })
    ));
    assert_eq!(visited.count(&job_id).expect("Failed to count"), 0);
    assert_eq!(service.active_jobs(), 0);
}
