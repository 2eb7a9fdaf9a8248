//! Phase 1: plain HTTP fetch
//!
//! A single GET under a hard deadline. The response is either good enough
//! to use as-is, or tells the caller whether a browser render is worth
//! trying.

use crate::config::FetcherConfig;
use crate::extract::ContentKind;
use crate::fetch::user_agent::random_user_agent;
use crate::fetch::{FetchResult, PhaseOutcome};
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Builds the HTTP client shared by every phase-1 request
///
/// Redirects are followed with reqwest's default limit. The user agent is
/// set per request, not here.
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_millis(config.http_timeout_ms))
        .gzip(true)
        .brotli(true)
        .build()
}

/// The HTTP phase of the hybrid fetcher
#[derive(Debug, Clone)]
pub struct HttpPhase {
    client: Client,
    timeout: Duration,
    min_html_length: usize,
    shell_markers: Vec<String>,
}

impl HttpPhase {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            timeout: Duration::from_millis(config.http_timeout_ms),
            min_html_length: config.min_html_length,
            shell_markers: config.shell_markers.clone(),
        })
    }

    /// Fetches `url` and classifies the response
    ///
    /// | Condition | Outcome |
    /// |-----------|---------|
    /// | Deadline exceeded | `Abandon` |
    /// | Other transport error | `NeedsBrowser` |
    /// | Status other than 200 | `NeedsBrowser` |
    /// | `application/pdf` | `Accepted` as PDF |
    /// | Long markup without a shell marker | `Accepted` as HTML |
    /// | Anything else | `NeedsBrowser` |
    pub async fn fetch(&self, url: &str) -> PhaseOutcome {
        let response = match self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(&e),
        };

        let status = response.status();
        let resolved_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if status != StatusCode::OK {
            return PhaseOutcome::NeedsBrowser(format!("HTTP status {}", status.as_u16()));
        }

        match response.bytes().await {
            Ok(body) => self.classify(&content_type, body.to_vec(), resolved_url),
            Err(e) => transport_failure(&e),
        }
    }

    /// Decides what a successful (200) response is worth
    pub fn classify(&self, content_type: &str, body: Vec<u8>, resolved_url: String) -> PhaseOutcome {
        if ContentKind::from_content_type(content_type) == ContentKind::Pdf {
            return PhaseOutcome::Accepted(FetchResult {
                content: body,
                kind: ContentKind::Pdf,
                resolved_url,
            });
        }

        let text = String::from_utf8_lossy(&body);
        let length = text.chars().count();
        if length <= self.min_html_length {
            return PhaseOutcome::NeedsBrowser(format!("markup too short ({length} chars)"));
        }

        if let Some(marker) = self.shell_markers.iter().find(|m| text.contains(m.as_str())) {
            return PhaseOutcome::NeedsBrowser(format!("empty application shell ({marker})"));
        }

        PhaseOutcome::Accepted(FetchResult {
            content: body,
            kind: ContentKind::Html,
            resolved_url,
        })
    }
}

fn transport_failure(error: &reqwest::Error) -> PhaseOutcome {
    if error.is_timeout() {
        PhaseOutcome::Abandon("HTTP deadline exceeded".to_string())
    } else {
        PhaseOutcome::NeedsBrowser(format!("transport error: {error}"))
    }
}
