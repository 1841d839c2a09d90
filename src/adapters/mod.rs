//! Content adapters turning a page URL into Markdown
//!
//! An [`Adapter`] is one acquisition strategy. The [`AdapterChain`] tries its adapters in
//! priority order and stops at the first success:
//!
//! 1. `endpoint` - Markdown through `Accept: text/markdown` on allowlisted hosts
//! 2. `mdx` - raw Markdown source at a sibling `.md` path on allowlisted hosts
//! 3. `jina` - the Jina reader API, only when opted in
//! 4. `rendering` - headless Chromium plus the extraction pipeline, for every URL

mod browser;
mod endpoint;
mod jina;
mod mdx;
mod rendering;

pub use browser::BrowserSession;
pub use endpoint::{EndpointAdapter, DEFAULT_ENDPOINT_HOSTS, MIN_MARKDOWN_LEN};
pub use jina::{JinaAdapter, JINA_API_KEY_ENV, JINA_READER_BASE};
pub use mdx::{source_url, MdxAdapter, DEFAULT_MDX_HOSTS};
pub use rendering::{RenderedPage, Renderer, RenderingAdapter};

use crate::config::{AdapterKind, CrawlOptions};
use crate::extract::SiteRegistry;
use crate::state::BlockReason;
use async_trait::async_trait;
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Errors produced while acquiring the content of one page
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Invalid content: {0}")]
    InvalidContent(String),

    #[error("Blocked content: {}", .0.description())]
    Blocked(BlockReason),

    #[error("Render error: {0}")]
    Render(String),

    #[error("All adapters failed: {}", format_attempts(.0))]
    Exhausted(Vec<AttemptFailure>),
}

impl AdapterError {
    /// Converts a client error, keeping timeouts distinguishable
    pub fn from_request(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            let target = error
                .url()
                .map(|u| u.to_string())
                .unwrap_or_else(|| "request".to_string());
            Self::Timeout(target)
        } else {
            Self::Http(error)
        }
    }

    /// The block reason carried by this error, if content was judged not genuine
    ///
    /// An exhausted chain reports the first blocked attempt.
    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            Self::Blocked(reason) => Some(*reason),
            Self::Exhausted(attempts) => attempts.iter().find_map(|a| a.blocked),
            _ => None,
        }
    }
}

/// One failed adapter attempt inside a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptFailure {
    pub adapter: &'static str,
    pub message: String,
    pub blocked: Option<BlockReason>,
}

impl AttemptFailure {
    fn new(adapter: &'static str, error: &AdapterError) -> Self {
        Self {
            adapter,
            message: error.to_string(),
            blocked: error.block_reason(),
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.adapter, self.message)
    }
}

fn format_attempts(attempts: &[AttemptFailure]) -> String {
    if attempts.is_empty() {
        return "no adapter handles this URL".to_string();
    }
    attempts
        .iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// A strategy for producing Markdown for a URL
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Name reported in outcomes
    fn name(&self) -> &'static str;

    /// Whether the chain should try this adapter for `url`
    fn matches(&self, url: &Url) -> bool;

    /// Produces Markdown for `url`
    async fn fetch(&self, url: &Url) -> Result<String, AdapterError>;

    /// Releases resources held across fetches
    async fn release(&self) {}
}

/// Markdown produced by the chain and the adapter that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub content: String,
    pub adapter: &'static str,
}

/// Ordered list of adapters tried until one succeeds
pub struct AdapterChain {
    adapters: Vec<Box<dyn Adapter>>,
    forced: bool,
}

impl AdapterChain {
    /// A chain trying `adapters` in order, each only when it matches the URL
    pub fn new(adapters: Vec<Box<dyn Adapter>>) -> Self {
        Self {
            adapters,
            forced: false,
        }
    }

    /// A chain of exactly one adapter, used for every URL
    ///
    /// The adapter's own error is returned unchanged on failure.
    pub fn forced(adapter: Box<dyn Adapter>) -> Self {
        Self {
            adapters: vec![adapter],
            forced: true,
        }
    }

    /// Builds the chain for a crawl invocation
    ///
    /// # Arguments
    ///
    /// * `options` - Crawl options (forced adapter, reader opt-in, timeouts)
    /// * `client` - Shared HTTP client for the HTTP adapters
    /// * `registry` - Site configs used by the rendering adapter
    pub fn standard(options: &CrawlOptions, client: Client, registry: Arc<SiteRegistry>) -> Self {
        let renderer: Arc<dyn Renderer> = Arc::new(BrowserSession::new(options.page_timeout()));

        let build = |kind: AdapterKind, forced: bool| -> Box<dyn Adapter> {
            match kind {
                AdapterKind::Endpoint => Box::new(EndpointAdapter::new(client.clone())),
                AdapterKind::Mdx => Box::new(MdxAdapter::new(client.clone())),
                AdapterKind::Jina => Box::new(JinaAdapter::from_env(
                    client.clone(),
                    forced || options.use_jina,
                )),
                AdapterKind::Rendering => Box::new(RenderingAdapter::new(
                    Arc::clone(&renderer),
                    Arc::clone(&registry),
                    options.page_timeout(),
                    options.selector_timeout(),
                )),
            }
        };

        match options.forced_adapter {
            Some(kind) => {
                tracing::info!("Using only the {} adapter", kind.name());
                Self::forced(build(kind, true))
            }
            None => Self::new(vec![
                build(AdapterKind::Endpoint, false),
                build(AdapterKind::Mdx, false),
                build(AdapterKind::Jina, false),
                build(AdapterKind::Rendering, false),
            ]),
        }
    }

    /// Names of the adapters in priority order
    pub fn names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Fetches Markdown for `url` from the first adapter that succeeds
    pub async fn fetch_markdown(&self, url: &Url) -> Result<FetchedPage, AdapterError> {
        if self.forced {
            if let Some(adapter) = self.adapters.first() {
                let content = adapter.fetch(url).await?;
                return Ok(FetchedPage {
                    content,
                    adapter: adapter.name(),
                });
            }
        }

        let mut attempts = Vec::new();

        for adapter in &self.adapters {
            if !adapter.matches(url) {
                continue;
            }

            tracing::debug!("Trying {} adapter for {}", adapter.name(), url);
            match adapter.fetch(url).await {
                Ok(content) => {
                    return Ok(FetchedPage {
                        content,
                        adapter: adapter.name(),
                    });
                }
                Err(e) => {
                    tracing::debug!("{} adapter failed for {}: {}", adapter.name(), url, e);
                    attempts.push(AttemptFailure::new(adapter.name(), &e));
                }
            }
        }

        Err(AdapterError::Exhausted(attempts))
    }

    /// Releases every adapter's held resources
    pub async fn release(&self) {
        for adapter in &self.adapters {
            adapter.release().await;
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Scripted, ScriptedAdapter};
    use super::*;
    use std::sync::atomic::Ordering;

    const URL: &str = "https://x.com/docs/a";

    fn url() -> Url {
        Url::parse(URL).unwrap()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = AdapterChain::new(vec![
            Box::new(ScriptedAdapter::new("first")),
            Box::new(ScriptedAdapter::new("second").page(URL, "# A")),
            Box::new(ScriptedAdapter::new("third").page(URL, "# never")),
        ]);

        let page = chain.fetch_markdown(&url()).await.unwrap();
        assert_eq!(page.adapter, "second");
        assert_eq!(page.content, "# A");
    }

    #[tokio::test]
    async fn test_non_matching_adapter_skipped() {
        let mut skipped = ScriptedAdapter::new("skipped").page(URL, "# wrong");
        skipped.matches_all = false;
        let chain = AdapterChain::new(vec![
            Box::new(skipped),
            Box::new(ScriptedAdapter::new("used").page(URL, "# right")),
        ]);

        let page = chain.fetch_markdown(&url()).await.unwrap();
        assert_eq!(page.adapter, "used");
    }

    #[tokio::test]
    async fn test_endpoint_html_falls_through_to_mdx() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/docs/install"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<!DOCTYPE html><html><body>Install</body></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/docs/install.md"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("# Install\n\nRun the installer script.\n"),
            )
            .mount(&server)
            .await;

        let local = vec!["127.0.0.1".to_string()];
        let chain = AdapterChain::new(vec![
            Box::new(EndpointAdapter::with_hosts(Client::new(), local.clone())),
            Box::new(MdxAdapter::with_hosts(Client::new(), local)),
        ]);

        let page_url = Url::parse(&format!("{}/docs/install", server.uri())).unwrap();
        let page = chain.fetch_markdown(&page_url).await.unwrap();
        assert_eq!(page.adapter, "mdx");
        assert!(page.content.starts_with("# Install"));
    }

    #[tokio::test]
    async fn test_exhausted_lists_every_attempt() {
        let chain = AdapterChain::new(vec![
            Box::new(ScriptedAdapter::new("one")),
            Box::new(ScriptedAdapter::new("two").respond(URL, Scripted::Timeout)),
        ]);

        let err = chain.fetch_markdown(&url()).await.unwrap_err();
        match &err {
            AdapterError::Exhausted(attempts) => {
                assert_eq!(attempts.len(), 2);
                assert_eq!(attempts[0].adapter, "one");
                assert_eq!(attempts[1].adapter, "two");
            }
            other => panic!("unexpected error: {other}"),
        }
        let message = err.to_string();
        assert!(message.contains("one: HTTP status 404"));
        assert!(message.contains("two: Timed out"));
        assert_eq!(err.block_reason(), None);
    }

    #[tokio::test]
    async fn test_exhausted_with_blocked_attempt_reports_reason() {
        let chain = AdapterChain::new(vec![
            Box::new(ScriptedAdapter::new("one")),
            Box::new(
                ScriptedAdapter::new("two").respond(URL, Scripted::Blocked(BlockReason::Cloudflare)),
            ),
        ]);

        let err = chain.fetch_markdown(&url()).await.unwrap_err();
        assert_eq!(err.block_reason(), Some(BlockReason::Cloudflare));
    }

    #[tokio::test]
    async fn test_forced_adapter_error_is_unchanged() {
        let mut adapter = ScriptedAdapter::new("only").respond(URL, Scripted::Timeout);
        adapter.matches_all = false;
        let chain = AdapterChain::forced(Box::new(adapter));

        let err = chain.fetch_markdown(&url()).await.unwrap_err();
        assert!(matches!(err, AdapterError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_forced_adapter_ignores_matches() {
        let mut adapter = ScriptedAdapter::new("only").page(URL, "# forced");
        adapter.matches_all = false;
        let chain = AdapterChain::forced(Box::new(adapter));

        let page = chain.fetch_markdown(&url()).await.unwrap();
        assert_eq!(page.adapter, "only");
    }

    #[tokio::test]
    async fn test_release_reaches_every_adapter() {
        let first = ScriptedAdapter::new("a");
        let second = ScriptedAdapter::new("b");
        let counters = [Arc::clone(&first.releases), Arc::clone(&second.releases)];
        let chain = AdapterChain::new(vec![Box::new(first), Box::new(second)]);

        chain.release().await;
        for counter in counters {
            assert_eq!(counter.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn test_standard_chain_order() {
        let options = CrawlOptions::default();
        let chain = AdapterChain::standard(
            &options,
            Client::new(),
            Arc::new(SiteRegistry::builtin()),
        );
        assert_eq!(chain.names(), vec!["endpoint", "mdx", "jina", "rendering"]);
    }

    #[test]
    fn test_standard_chain_forced() {
        let options = CrawlOptions {
            forced_adapter: Some(AdapterKind::Mdx),
            ..CrawlOptions::default()
        };
        let chain = AdapterChain::standard(
            &options,
            Client::new(),
            Arc::new(SiteRegistry::builtin()),
        );
        assert_eq!(chain.names(), vec!["mdx"]);
    }
}
