//! Hybrid page fetcher
//!
//! Two phases, each under its own deadline:
//! - Phase 1: a plain HTTP GET, kept when it returns a PDF or real markup
//! - Phase 2: a headless browser render for pages that need scripts to run
//!
//! Fetching never fails outward. Every failure ends in "no result" and is
//! logged here.

mod browser;
mod http;
mod user_agent;

pub use browser::{ChromiumRenderer, PageRenderer, RenderedPage};
pub use http::{build_http_client, HttpPhase};
pub use user_agent::{random_user_agent, USER_AGENTS};

use crate::config::FetcherConfig;
use crate::extract::ContentKind;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Content retrieved for one URL
#[derive(Debug, Clone, PartialEq)]
pub struct FetchResult {
    /// Raw body bytes
    pub content: Vec<u8>,
    /// Format of the body
    pub kind: ContentKind,
    /// URL after redirects
    pub resolved_url: String,
}

/// What a single fetch phase decided
#[derive(Debug)]
pub enum PhaseOutcome {
    /// Usable content; stop here
    Accepted(FetchResult),
    /// Not usable as-is, but a browser render may succeed
    NeedsBrowser(String),
    /// Give up on this URL without trying the browser
    Abandon(String),
}

/// Retrieves page content for the crawl orchestrator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Returns the content of `url`, or `None` if every phase failed
    async fn fetch(&self, url: &str) -> Option<FetchResult>;
}

/// HTTP first, headless browser as fallback
pub struct HybridFetcher {
    http: HttpPhase,
    renderer: Option<Arc<dyn PageRenderer>>,
}

impl HybridFetcher {
    /// Creates a fetcher from configuration
    ///
    /// The browser phase uses Chromium unless `browser-fallback` is off.
    ///
    /// # Returns
    ///
    /// * `Ok(HybridFetcher)` - Ready to fetch
    /// * `Err(reqwest::Error)` - The HTTP client could not be built
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let renderer: Option<Arc<dyn PageRenderer>> = if config.browser_fallback {
            Some(Arc::new(ChromiumRenderer::new(config)))
        } else {
            None
        };

        Ok(Self {
            http: HttpPhase::new(config)?,
            renderer,
        })
    }

    /// Creates a fetcher with a caller-supplied browser phase
    pub fn with_renderer(
        config: &FetcherConfig,
        renderer: Arc<dyn PageRenderer>,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            http: HttpPhase::new(config)?,
            renderer: Some(renderer),
        })
    }

    async fn render(&self, url: &str) -> Option<FetchResult> {
        let renderer = self.renderer.as_ref()?;

        match renderer.render(url).await {
            Ok(page) => Some(FetchResult {
                content: page.html.into_bytes(),
                kind: ContentKind::Html,
                resolved_url: page.final_url,
            }),
            Err(e) => {
                warn!("Browser render of {} failed: {:#}", url, e);
                None
            }
        }
    }
}

#[async_trait]
impl PageFetcher for HybridFetcher {
    async fn fetch(&self, url: &str) -> Option<FetchResult> {
        match self.http.fetch(url).await {
            PhaseOutcome::Accepted(result) => Some(result),
            PhaseOutcome::Abandon(reason) => {
                warn!("Abandoning {}: {}", url, reason);
                None
            }
            PhaseOutcome::NeedsBrowser(reason) => {
                debug!("HTTP phase for {} not usable: {}", url, reason);
                self.render(url).await
            }
        }
    }
}
