//! Phase 2: headless browser render
//!
//! Each render launches its own Chromium with a throwaway profile directory,
//! so no cookies, cache or storage leak between pages. The browser is closed
//! on every path, including navigation failures and deadline breaches.
//!
//! Navigation is ready once `DOMContentLoaded` fires; images and other
//! subresources are not waited for. Every CDP command shares the navigation
//! deadline, and launching Chromium has its own fixed bound.

use crate::config::FetcherConfig;
use crate::fetch::user_agent::random_user_agent;
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventDomContentEventFired, NavigateParams};
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Upper bound on starting Chromium and attaching to it
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Markup and final URL captured from a rendered page
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    pub html: String,
    pub final_url: String,
}

/// Something that can execute a page's scripts and return the resulting DOM
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> anyhow::Result<RenderedPage>;
}

/// Renders pages in a fresh headless Chromium per call
#[derive(Debug, Clone)]
pub struct ChromiumRenderer {
    navigation_timeout: Duration,
    settle: Duration,
}

impl ChromiumRenderer {
    pub fn new(config: &FetcherConfig) -> Self {
        Self {
            navigation_timeout: Duration::from_millis(config.navigation_timeout_ms),
            settle: Duration::from_millis(config.settle_ms),
        }
    }

    /// Deadline applied to each individual CDP request
    fn request_timeout(&self) -> Duration {
        self.navigation_timeout
    }

    fn browser_config(&self, profile_dir: &Path) -> anyhow::Result<BrowserConfig> {
        BrowserConfig::builder()
            .user_data_dir(profile_dir)
            .arg(format!("--user-agent={}", random_user_agent()))
            .launch_timeout(LAUNCH_TIMEOUT)
            .request_timeout(self.request_timeout())
            .build()
            .map_err(|e| anyhow!("invalid browser configuration: {e}"))
    }

    async fn render_with(&self, browser: &Browser, url: &str) -> anyhow::Result<RenderedPage> {
        let page = browser
            .new_page("about:blank")
            .await
            .context("failed to open browser tab")?;

        tokio::time::timeout(self.navigation_timeout, self.navigate(&page, url))
            .await
            .map_err(|_| anyhow!("navigation timed out after {:?}", self.navigation_timeout))??;

        page.evaluate(SCROLL_TO_BOTTOM)
            .await
            .context("scroll failed")?;
        tokio::time::sleep(self.settle).await;

        let html = page.content().await.context("failed to read rendered DOM")?;
        let final_url = page
            .url()
            .await
            .context("failed to read final URL")?
            .unwrap_or_else(|| url.to_string());

        Ok(RenderedPage { html, final_url })
    }

    /// Navigates `page` to `url` and resolves once the DOM content has loaded
    async fn navigate(&self, page: &Page, url: &str) -> anyhow::Result<()> {
        // Subscribe first so a fast page cannot fire before we listen
        let mut dom_ready = page
            .event_listener::<EventDomContentEventFired>()
            .await
            .context("failed to listen for DOMContentLoaded")?;

        let response = page
            .execute(NavigateParams::new(url))
            .await
            .with_context(|| format!("navigation to {url} failed"))?;
        if let Some(error) = response.result.error_text.as_deref() {
            return Err(anyhow!("navigation to {url} failed: {error}"));
        }

        dom_ready
            .next()
            .await
            .map(|_| ())
            .ok_or_else(|| anyhow!("page closed before DOMContentLoaded for {url}"))
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&self, url: &str) -> anyhow::Result<RenderedPage> {
        let profile_dir = profile_dir();
        let config = self.browser_config(&profile_dir)?;

        let (mut browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch headless browser")?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let rendered = self.render_with(&browser, url).await;

        if let Err(e) = browser.close().await {
            debug!("Browser close for {} failed: {}", url, e);
        }
        if let Err(e) = browser.wait().await {
            debug!("Waiting on browser process for {} failed: {}", url, e);
        }
        handler_task.abort();
        if let Err(e) = tokio::fs::remove_dir_all(&profile_dir).await {
            debug!("Could not remove browser profile {}: {}", profile_dir.display(), e);
        }

        rendered
    }
}

fn profile_dir() -> PathBuf {
    std::env::temp_dir().join(format!("uni-scout-browser-{}", Uuid::new_v4()))
}
