use crate::adapters::{Adapter, AdapterError};
use crate::extract::validate_content;
use crate::url::host_in_list;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use url::Url;

/// Hosts known to answer `Accept: text/markdown` with Markdown
pub const DEFAULT_ENDPOINT_HOSTS: &[&str] = &[
    "developers.cloudflare.com",
    "docs.anthropic.com",
    "vercel.com",
    "mintlify.com",
];

/// Bodies shorter than this are not accepted as a page
pub const MIN_MARKDOWN_LEN: usize = 100;

/// Prefixes of a body that is an HTML document rather than Markdown
const HTML_DOCUMENT_PREFIXES: &[&str] = &["<!doctype html", "<html"];

/// Fetches Markdown through content negotiation on the page URL itself
pub struct EndpointAdapter {
    client: Client,
    hosts: Vec<String>,
}

impl EndpointAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_hosts(
            client,
            DEFAULT_ENDPOINT_HOSTS.iter().map(|h| h.to_string()).collect(),
        )
    }

    pub fn with_hosts(client: Client, hosts: Vec<String>) -> Self {
        Self { client, hosts }
    }
}

/// Rejects a negotiated body that is not plausibly Markdown
pub(crate) fn check_markdown(content_type: Option<&str>, body: &str) -> Result<(), AdapterError> {
    if let Some(ct) = content_type {
        let ct = ct.to_ascii_lowercase();
        if ct.contains("text/html") || ct.contains("application/json") {
            return Err(AdapterError::InvalidContent(format!(
                "unexpected content type {}",
                ct
            )));
        }
    }

    let trimmed = body.trim();
    let lower = trimmed.to_ascii_lowercase();

    if HTML_DOCUMENT_PREFIXES.iter().any(|p| lower.starts_with(p)) {
        return Err(AdapterError::InvalidContent(
            "response contains an HTML document".to_string(),
        ));
    }

    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if looks_like_json {
        return Err(AdapterError::InvalidContent(
            "response looks like JSON".to_string(),
        ));
    }

    if trimmed.chars().count() < MIN_MARKDOWN_LEN {
        return Err(AdapterError::InvalidContent(format!(
            "response shorter than {} characters",
            MIN_MARKDOWN_LEN
        )));
    }

    Ok(())
}

#[async_trait]
impl Adapter for EndpointAdapter {
    fn name(&self) -> &'static str {
        "endpoint"
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host_in_list(self.hosts.as_slice(), host))
            .unwrap_or(false)
    }

    async fn fetch(&self, url: &Url) -> Result<String, AdapterError> {
        let response = self
            .client
            .get(url.as_str())
            .header(ACCEPT, "text/markdown")
            .send()
            .await
            .map_err(AdapterError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.text().await.map_err(AdapterError::from_request)?;
        check_markdown(content_type.as_deref(), &body)?;
        validate_content(&body).map_err(AdapterError::Blocked)?;

        Ok(body)
    }
}
