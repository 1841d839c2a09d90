//! Headless Chromium session shared by every rendering fetch of a crawl

use crate::adapters::rendering::{RenderedPage, Renderer};
use crate::adapters::AdapterError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::Url;

const SELECTOR_POLL: Duration = Duration::from_millis(100);

struct Session {
    browser: Browser,
    handler: JoinHandle<()>,
}

/// Lazily launched browser reused across fetches
///
/// The browser starts on the first [`Renderer::open`] call. Each fetch gets its own page,
/// and [`Renderer::release`] closes the browser; a later `open` launches a new one.
pub struct BrowserSession {
    session: Mutex<Option<Session>>,
    request_timeout: Duration,
}

impl BrowserSession {
    pub fn new(request_timeout: Duration) -> Self {
        Self {
            session: Mutex::new(None),
            request_timeout,
        }
    }

    async fn launch(request_timeout: Duration) -> Result<Session, AdapterError> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(request_timeout)
            .build()
            .map_err(AdapterError::Render)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| AdapterError::Render(format!("failed to launch browser: {}", e)))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::info!("Launched headless browser");
        Ok(Session { browser, handler })
    }

    async fn new_page(&self) -> Result<Page, AdapterError> {
        let mut guard = self.session.lock().await;
        if guard.is_none() {
            *guard = Some(Self::launch(self.request_timeout).await?);
        }

        match guard.as_ref() {
            Some(session) => session
                .browser
                .new_page("about:blank")
                .await
                .map_err(|e| AdapterError::Render(format!("failed to open page: {}", e))),
            None => Err(AdapterError::Render("browser unavailable".to_string())),
        }
    }
}

#[async_trait]
impl Renderer for BrowserSession {
    async fn open(&self, url: &Url, timeout: Duration) -> Result<Box<dyn RenderedPage>, AdapterError> {
        let page = self.new_page().await?;

        let navigation = tokio::time::timeout(timeout, page.goto(url.as_str())).await;
        let failure = match navigation {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(AdapterError::Render(format!("navigation failed: {}", e))),
            Err(_) => Some(AdapterError::Timeout(url.to_string())),
        };

        if let Some(error) = failure {
            if let Err(e) = page.close().await {
                tracing::debug!("Failed to close page for {}: {}", url, e);
            }
            return Err(error);
        }

        Ok(Box::new(ChromePage { page }))
    }

    async fn release(&self) {
        let session = self.session.lock().await.take();
        if let Some(mut session) = session {
            if let Err(e) = session.browser.close().await {
                tracing::warn!("Failed to close browser: {}", e);
            }
            if let Err(e) = session.browser.wait().await {
                tracing::debug!("Browser process did not exit cleanly: {}", e);
            }
            session.handler.abort();
            tracing::info!("Closed headless browser");
        }
    }
}

struct ChromePage {
    page: Page,
}

#[async_trait]
impl RenderedPage for ChromePage {
    async fn html(&self) -> Result<String, AdapterError> {
        self.page
            .content()
            .await
            .map_err(|e| AdapterError::Render(format!("failed to read page content: {}", e)))
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.page.find_element(selector).await.is_ok() {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(SELECTOR_POLL).await;
        }
    }

    async fn close(&self) {
        if let Err(e) = self.page.clone().close().await {
            tracing::debug!("Failed to close page: {}", e);
        }
    }
}
