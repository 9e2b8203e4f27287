//! Headless-browser fetcher for JavaScript-rendered portals.

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::{Document, FetchOptions, PageFetcher};

// Time given to client-side rendering after navigation settles.
const RENDER_WAIT: Duration = Duration::from_secs(3);

/// Fetcher that loads pages in headless Chrome and captures the rendered
/// DOM. The browser API is synchronous; every page load blocks the refresh,
/// which matches the deliberately sequential scraping model.
pub struct BrowserFetcher {
    browser: Browser,
}

impl BrowserFetcher {
    /// Launch a headless Chrome instance. Fails when no usable browser
    /// binary is found; browser-rendered sites are then skipped.
    pub fn new() -> Result<Self, FetchError> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(true)
            .build()
            .map_err(|e| FetchError::Render(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| FetchError::Render(e.to_string()))?;

        Ok(Self { browser })
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<Document, FetchError> {
        debug!("Rendering {}", url);

        let tab = self
            .browser
            .new_tab()
            .map_err(|e| FetchError::Render(e.to_string()))?;

        tab.navigate_to(url)
            .map_err(|e| FetchError::Render(e.to_string()))?;
        tab.wait_until_navigated()
            .map_err(|e| FetchError::Render(e.to_string()))?;

        // the CDP calls around this are synchronous, but the render wait
        // itself need not park a worker thread
        tokio::time::sleep(RENDER_WAIT).await;

        let result = tab
            .evaluate("document.documentElement.outerHTML", false)
            .map_err(|e| FetchError::Render(e.to_string()))?;

        let html = result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let _ = tab.close(true);

        if html.is_empty() {
            return Err(FetchError::Render("rendered document is empty".into()));
        }

        Ok(Document::Html(html))
    }
}
