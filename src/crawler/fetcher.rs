//! HTTP client construction and plain-text fetches
//!
//! This module handles:
//! - Building the shared HTTP client with the crawl's user agent and timeouts
//! - Fetching text documents (sitemaps, robots.txt) with status checking

use crate::MirrorError;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by the adapters and the sitemap reader
///
/// # Arguments
///
/// * `user_agent` - The user agent sent with every request
/// * `timeout` - Bound on each request
///
/// # Example
///
/// ```no_run
/// use docmirror::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("docmirror/1.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10).min(timeout))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// Non-success statuses are errors.
pub async fn fetch_text(client: &Client, url: &Url) -> Result<String, MirrorError> {
    let response = client
        .get(url.as_str())
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|source| MirrorError::Http {
            url: url.to_string(),
            source,
        })?;

    response.text().await.map_err(|source| MirrorError::Http {
        url: url.to_string(),
        source,
    })
}
