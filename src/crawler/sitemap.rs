//! Sitemap discovery and enumeration
//!
//! Sitemap indexes are followed recursively. A child sitemap that cannot be fetched is
//! logged and skipped; the crawl uses whatever URLs the remaining documents list.

use crate::crawler::fetcher::fetch_text;
use crate::url::canonicalize;
use crate::MirrorError;
use regex::Regex;
use reqwest::Client;
use std::collections::{HashSet, VecDeque};
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static SITEMAP_LOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<sitemap\b[^>]*>.*?<loc>\s*(.*?)\s*</loc>").expect("valid regex")
});

static URL_LOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<url\b[^>]*>.*?<loc>\s*(.*?)\s*</loc>").expect("valid regex")
});

static ROBOTS_SITEMAP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^\s*sitemap\s*:\s*(\S+)").expect("valid regex"));

/// Entries of one sitemap document
#[derive(Debug, Default, PartialEq)]
pub struct SitemapDocument {
    /// Child sitemaps listed by a sitemap index
    pub sitemaps: Vec<String>,

    /// Page URLs listed by a URL set
    pub urls: Vec<String>,
}

/// Parses sitemap XML into child sitemaps and page URLs
pub fn parse_sitemap(xml: &str) -> SitemapDocument {
    let loc = |caps: regex::Captures<'_>| caps.get(1).map(|m| clean_loc(m.as_str()));
    SitemapDocument {
        sitemaps: SITEMAP_LOC_RE
            .captures_iter(xml)
            .filter_map(loc)
            .filter(|s| !s.is_empty())
            .collect(),
        urls: URL_LOC_RE
            .captures_iter(xml)
            .filter_map(loc)
            .filter(|s| !s.is_empty())
            .collect(),
    }
}

fn clean_loc(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("<![CDATA[")
        .and_then(|s| s.strip_suffix("]]>"))
        .unwrap_or(raw);
    raw.trim()
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

/// Reads sitemaps over HTTP
pub struct SitemapReader {
    client: Client,
}

impl SitemapReader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Collects every page URL reachable from a sitemap, following indexes
    ///
    /// Each sitemap is fetched at most once. The root sitemap must be fetchable; failures
    /// on child sitemaps are logged and skipped.
    pub async fn fetch_all_urls(&self, sitemap_url: &Url) -> Result<Vec<Url>, MirrorError> {
        let mut queue = VecDeque::from([sitemap_url.clone()]);
        let mut visited = HashSet::new();
        let mut seen_pages = HashSet::new();
        let mut pages = Vec::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.to_string()) {
                continue;
            }

            let xml = match fetch_text(&self.client, &current).await {
                Ok(xml) => xml,
                Err(e) if current == *sitemap_url => return Err(e),
                Err(e) => {
                    warn!("Skipping sitemap {}: {}", current, e);
                    continue;
                }
            };

            let document = parse_sitemap(&xml);
            debug!(
                "Sitemap {} lists {} sitemaps and {} pages",
                current,
                document.sitemaps.len(),
                document.urls.len()
            );

            for child in document.sitemaps {
                match current.join(&child) {
                    Ok(url) => queue.push_back(url),
                    Err(e) => debug!("Ignoring sitemap entry '{}': {}", child, e),
                }
            }

            for loc in document.urls {
                let Some(url) = current.join(&loc).ok().and_then(|u| canonicalize(u).ok()) else {
                    debug!("Ignoring page entry '{}'", loc);
                    continue;
                };
                if seen_pages.insert(url.to_string()) {
                    pages.push(url);
                }
            }
        }

        Ok(pages)
    }

    /// Finds the site's sitemap and returns its page URLs
    ///
    /// Candidates, in order:
    /// 1. the entry URL itself when it names an `.xml` file
    /// 2. `Sitemap:` lines of `/robots.txt`
    /// 3. `/sitemap.xml`
    /// 4. `/sitemap_index.xml`
    /// 5. `sitemap.xml` under the entry's documentation base path
    ///
    /// The first candidate listing at least one page wins.
    pub async fn discover(&self, entry: &Url, base_path: Option<&str>) -> Result<Vec<Url>, MirrorError> {
        for candidate in self.candidates(entry, base_path).await {
            match self.fetch_all_urls(&candidate).await {
                Ok(urls) if !urls.is_empty() => {
                    tracing::info!("Using sitemap {} ({} pages)", candidate, urls.len());
                    return Ok(urls);
                }
                Ok(_) => debug!("Sitemap {} lists no pages", candidate),
                Err(e) => debug!("Sitemap candidate {} unavailable: {}", candidate, e),
            }
        }

        Err(MirrorError::SitemapUnavailable {
            url: entry.to_string(),
        })
    }

    async fn candidates(&self, entry: &Url, base_path: Option<&str>) -> Vec<Url> {
        let mut candidates = Vec::new();
        let push = |url: Url, list: &mut Vec<Url>| {
            if !list.contains(&url) {
                list.push(url);
            }
        };

        if entry.path().to_ascii_lowercase().ends_with(".xml") {
            push(entry.clone(), &mut candidates);
        }

        if let Ok(robots) = entry.join("/robots.txt") {
            match fetch_text(&self.client, &robots).await {
                Ok(body) => {
                    for caps in ROBOTS_SITEMAP_RE.captures_iter(&body) {
                        if let Some(url) = caps.get(1).and_then(|m| entry.join(m.as_str()).ok()) {
                            push(url, &mut candidates);
                        }
                    }
                }
                Err(e) => debug!("No robots.txt for {}: {}", entry, e),
            }
        }

        let mut fixed = vec!["/sitemap.xml".to_string(), "/sitemap_index.xml".to_string()];
        if let Some(base) = base_path {
            fixed.push(format!("{}/sitemap.xml", base.trim_end_matches('/')));
        }
        for path in fixed {
            if let Ok(url) = entry.join(&path) {
                push(url, &mut candidates);
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn url_set(server: &MockServer, paths: &[&str]) -> String {
        let entries: String = paths
            .iter()
            .map(|p| format!("<url><loc>{}{}</loc><lastmod>2024-01-01</lastmod></url>", server.uri(), p))
            .collect();
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">{}</urlset>"#,
            entries
        )
    }

    async fn serve(server: &MockServer, at: &str, body: String) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_parse_url_set() {
        let xml = r#"<urlset>
            <url><loc>https://x.com/docs/a</loc></url>
            <url>
              <loc><![CDATA[https://x.com/docs/b?x=1&amp;y=2]]></loc>
            </url>
        </urlset>"#;
        let doc = parse_sitemap(xml);
        assert!(doc.sitemaps.is_empty());
        assert_eq!(doc.urls, vec!["https://x.com/docs/a", "https://x.com/docs/b?x=1&y=2"]);
    }

    #[test]
    fn test_parse_index() {
        let xml = r#"<sitemapindex>
            <sitemap><loc>https://x.com/a.xml</loc><lastmod>2024-01-01</lastmod></sitemap>
            <sitemap><loc>https://x.com/b.xml</loc></sitemap>
        </sitemapindex>"#;
        let doc = parse_sitemap(xml);
        assert_eq!(doc.sitemaps, vec!["https://x.com/a.xml", "https://x.com/b.xml"]);
        assert!(doc.urls.is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(parse_sitemap("not xml at all"), SitemapDocument::default());
    }

    #[tokio::test]
    async fn test_index_with_children() {
        let server = MockServer::start().await;
        let index = format!(
            "<sitemapindex><sitemap><loc>{0}/one.xml</loc></sitemap><sitemap><loc>{0}/two.xml</loc></sitemap></sitemapindex>",
            server.uri()
        );
        serve(&server, "/sitemap.xml", index).await;
        serve(&server, "/one.xml", url_set(&server, &["/docs/a", "/docs/b"])).await;
        serve(&server, "/two.xml", url_set(&server, &["/docs/c", "/docs/d"])).await;

        let reader = SitemapReader::new(Client::new());
        let root = Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap();
        let urls = reader.fetch_all_urls(&root).await.unwrap();

        assert_eq!(urls.len(), 4);
        assert!(urls[0].as_str().ends_with("/docs/a"));
        assert!(urls[3].as_str().ends_with("/docs/d"));
    }

    #[tokio::test]
    async fn test_broken_child_is_skipped() {
        let server = MockServer::start().await;
        let index = format!(
            "<sitemapindex><sitemap><loc>{0}/missing.xml</loc></sitemap><sitemap><loc>{0}/ok.xml</loc></sitemap></sitemapindex>",
            server.uri()
        );
        serve(&server, "/sitemap.xml", index).await;
        serve(&server, "/ok.xml", url_set(&server, &["/docs/a"])).await;

        let reader = SitemapReader::new(Client::new());
        let root = Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap();
        let urls = reader.fetch_all_urls(&root).await.unwrap();
        assert_eq!(urls.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_pages_collapsed() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/sitemap.xml",
            url_set(&server, &["/docs/a", "/docs/a?tab=1", "/docs/a#top"]),
        )
        .await;

        let reader = SitemapReader::new(Client::new());
        let root = Url::parse(&format!("{}/sitemap.xml", server.uri())).unwrap();
        let urls = reader.fetch_all_urls(&root).await.unwrap();
        assert_eq!(urls.len(), 1);
    }

    #[tokio::test]
    async fn test_discover_via_robots() {
        let server = MockServer::start().await;
        serve(
            &server,
            "/robots.txt",
            format!("User-agent: *\nDisallow:\nSitemap: {}/custom-map.xml\n", server.uri()),
        )
        .await;
        serve(&server, "/custom-map.xml", url_set(&server, &["/docs/a", "/docs/b"])).await;

        let reader = SitemapReader::new(Client::new());
        let entry = Url::parse(&format!("{}/docs/", server.uri())).unwrap();
        let urls = reader.discover(&entry, Some("/docs/")).await.unwrap();
        assert_eq!(urls.len(), 2);
    }

    #[tokio::test]
    async fn test_discover_under_base_path() {
        let server = MockServer::start().await;
        serve(&server, "/docs/sitemap.xml", url_set(&server, &["/docs/a"])).await;

        let reader = SitemapReader::new(Client::new());
        let entry = Url::parse(&format!("{}/docs/intro", server.uri())).unwrap();
        let urls = reader.discover(&entry, Some("/docs/")).await.unwrap();
        assert_eq!(urls.len(), 1);
    }

    #[tokio::test]
    async fn test_discover_nothing() {
        let server = MockServer::start().await;
        let reader = SitemapReader::new(Client::new());
        let entry = Url::parse(&format!("{}/docs/", server.uri())).unwrap();
        let err = reader.discover(&entry, None).await.unwrap_err();
        assert!(matches!(err, MirrorError::SitemapUnavailable { .. }));
    }
}
