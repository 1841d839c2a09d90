use crate::adapters::{Adapter, AdapterError};
use crate::extract::{html_to_markdown, validate_content, SiteRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Pause after a content-ready selector times out, for late rendering
const SELECTOR_GRACE: Duration = Duration::from_millis(500);

/// Opens rendered pages; one implementation drives headless Chromium
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Opens a fresh page and navigates to `url`, waiting for the load event
    async fn open(&self, url: &Url, timeout: Duration) -> Result<Box<dyn RenderedPage>, AdapterError>;

    /// Shuts the rendering engine down
    async fn release(&self);
}

/// A page opened by a [`Renderer`]
#[async_trait]
pub trait RenderedPage: Send + Sync {
    /// Current serialized DOM
    async fn html(&self) -> Result<String, AdapterError>;

    /// Waits until `selector` matches; false on timeout
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool;

    async fn close(&self);
}

/// Universal fallback: render, clean, convert and validate
pub struct RenderingAdapter {
    renderer: Arc<dyn Renderer>,
    registry: Arc<SiteRegistry>,
    page_timeout: Duration,
    selector_timeout: Duration,
}

impl RenderingAdapter {
    pub fn new(
        renderer: Arc<dyn Renderer>,
        registry: Arc<SiteRegistry>,
        page_timeout: Duration,
        selector_timeout: Duration,
    ) -> Self {
        Self {
            renderer,
            registry,
            page_timeout,
            selector_timeout,
        }
    }

    async fn extract(&self, page: &dyn RenderedPage, url: &Url) -> Result<String, AdapterError> {
        let host = url.host_str().unwrap_or_default();
        let mut html = page.html().await?;
        let config = self.registry.select(host, &html).clone();

        if let Some(selector) = &config.wait_for_selector {
            if !page.wait_for_selector(selector, self.selector_timeout).await {
                tracing::debug!("'{}' never appeared on {}, continuing", selector, url);
                tokio::time::sleep(SELECTOR_GRACE).await;
            }
            html = page.html().await?;
        }

        let markdown = html_to_markdown(&html, url, &config);
        validate_content(&markdown).map_err(AdapterError::Blocked)?;
        Ok(markdown)
    }
}

#[async_trait]
impl Adapter for RenderingAdapter {
    fn name(&self) -> &'static str {
        "rendering"
    }

    fn matches(&self, _url: &Url) -> bool {
        true
    }

    async fn fetch(&self, url: &Url) -> Result<String, AdapterError> {
        let page = self.renderer.open(url, self.page_timeout).await?;
        let result = self.extract(page.as_ref(), url).await;
        page.close().await;
        result
    }

    async fn release(&self) {
        self.renderer.release().await;
    }
}
