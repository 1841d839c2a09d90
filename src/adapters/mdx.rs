use crate::adapters::{Adapter, AdapterError};
use crate::extract::validate_content;
use crate::url::host_in_list;
use async_trait::async_trait;
use reqwest::Client;
use url::Url;

/// Hosts known to publish the Markdown source of each page at `<path>.md`
pub const DEFAULT_MDX_HOSTS: &[&str] = &[
    "bun.sh",
    "svelte.dev",
    "docs.astral.sh",
    "developers.cloudflare.com",
];

/// Fetches the raw Markdown/MDX source published next to a page
pub struct MdxAdapter {
    client: Client,
    hosts: Vec<String>,
}

impl MdxAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_hosts(
            client,
            DEFAULT_MDX_HOSTS.iter().map(|h| h.to_string()).collect(),
        )
    }

    pub fn with_hosts(client: Client, hosts: Vec<String>) -> Self {
        Self { client, hosts }
    }
}

/// The URL of a page's Markdown source
///
/// A trailing slash is dropped and `.md` appended; paths already ending in `.md` or
/// `.mdx` are used as they are.
///
/// # Example
///
/// ```
/// use docmirror::adapters::source_url;
/// use url::Url;
///
/// let page = Url::parse("https://bun.sh/docs/install/").unwrap();
/// assert_eq!(source_url(&page).as_str(), "https://bun.sh/docs/install.md");
/// ```
pub fn source_url(url: &Url) -> Url {
    let path = url.path();
    if path.ends_with(".md") || path.ends_with(".mdx") {
        return url.clone();
    }

    let trimmed = path.trim_end_matches('/');
    let new_path = if trimmed.is_empty() {
        "/index.md".to_string()
    } else {
        format!("{}.md", trimmed)
    };

    let mut source = url.clone();
    source.set_path(&new_path);
    source
}

#[async_trait]
impl Adapter for MdxAdapter {
    fn name(&self) -> &'static str {
        "mdx"
    }

    fn matches(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| host_in_list(self.hosts.as_slice(), host))
            .unwrap_or(false)
    }

    async fn fetch(&self, url: &Url) -> Result<String, AdapterError> {
        let source = source_url(url);
        tracing::debug!("Fetching Markdown source {}", source);

        let response = self
            .client
            .get(source.as_str())
            .send()
            .await
            .map_err(AdapterError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(AdapterError::from_request)?;
        let head = body.trim_start().to_ascii_lowercase();
        if head.starts_with("<!doctype") || head.starts_with("<html") {
            return Err(AdapterError::InvalidContent(
                "source path served an HTML document".to_string(),
            ));
        }
        if body.trim().is_empty() {
            return Err(AdapterError::InvalidContent("empty source".to_string()));
        }
        validate_content(&body).map_err(AdapterError::Blocked)?;

        Ok(body)
    }
}
