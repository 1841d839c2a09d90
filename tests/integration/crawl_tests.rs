//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small documentation site and run full
//! crawls through the endpoint adapter, checking the written mirror and the report.

use docmirror::{crawl, AdapterKind, BlockReason, CrawlMode, CrawlOptions, MirrorError, Outcome};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates options that fetch every page through the endpoint adapter
fn create_test_options(out_dir: &Path, max_depth: u32) -> CrawlOptions {
    CrawlOptions {
        out_dir: out_dir.to_path_buf(),
        max_depth,
        concurrency: 2,
        forced_adapter: Some(AdapterKind::Endpoint),
        page_timeout_secs: 5,
        ..CrawlOptions::default()
    }
}

/// A Markdown page long enough to be accepted, followed by `links`
fn page(title: &str, links: &[&str]) -> String {
    let mut body = format!(
        "# {}\n\n{}\n\n",
        title,
        "This page documents one part of the project in some detail. ".repeat(3)
    );
    for link in links {
        body.push_str(&format!("- [{}]({})\n", link, link));
    }
    body
}

async fn serve(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/markdown"),
        )
        .mount(server)
        .await;
}

/// Serves a docs tree: index -> intro, guide/setup; guide/setup -> guide/advanced
async fn mount_site(server: &MockServer) {
    serve(
        server,
        "/docs/",
        page("Home", &["/docs/intro", "/docs/guide/setup", "/blog/news"]),
    )
    .await;
    serve(server, "/docs/intro", page("Intro", &["/docs/"])).await;
    serve(
        server,
        "/docs/guide/setup",
        page("Setup", &["/docs/guide/advanced", "/docs/intro"]),
    )
    .await;
    serve(server, "/docs/guide/advanced", page("Advanced", &[])).await;
}

#[tokio::test]
async fn test_full_link_crawl() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let out = TempDir::new().unwrap();

    let report = crawl(
        &format!("{}/docs/", server.uri()),
        create_test_options(out.path(), 3),
    )
    .await
    .unwrap();

    assert_eq!(report.saved.len(), 4);
    assert!(report.blocked.is_empty());
    assert!(report.failed.is_empty());
    assert!(report.finished_at.is_some());

    assert!(out.path().join("index.md").exists());
    assert!(out.path().join("intro.md").exists());
    assert!(out.path().join("guide/setup.md").exists());
    assert!(out.path().join("guide/advanced.md").exists());
    assert!(!out.path().join("news.md").exists());

    let setup = std::fs::read_to_string(out.path().join("guide/setup.md")).unwrap();
    assert!(setup.starts_with("# Setup"));

    assert!(report.saved.iter().all(|o| matches!(
        o,
        Outcome::Saved { adapter, .. } if adapter == "endpoint"
    )));
}

#[tokio::test]
async fn test_crawl_with_depth_limit() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let out = TempDir::new().unwrap();
    let report = crawl(
        &format!("{}/docs/", server.uri()),
        create_test_options(out.path(), 0),
    )
    .await
    .unwrap();
    assert_eq!(report.total(), 1);
    assert!(out.path().join("index.md").exists());

    let out = TempDir::new().unwrap();
    let report = crawl(
        &format!("{}/docs/", server.uri()),
        create_test_options(out.path(), 1),
    )
    .await
    .unwrap();
    assert_eq!(report.saved.len(), 3);
    assert!(!out.path().join("guide/advanced.md").exists());
}

#[tokio::test]
async fn test_pages_fetched_once() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let out = TempDir::new().unwrap();

    crawl(
        &format!("{}/docs/", server.uri()),
        create_test_options(out.path(), 5),
    )
    .await
    .unwrap();

    let requests = server.received_requests().await.unwrap();
    let mut paths: Vec<String> = requests.iter().map(|r| r.url.path().to_string()).collect();
    let total = paths.len();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), total);
    assert_eq!(total, 4);
}

#[tokio::test]
async fn test_numbered_output() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let out = TempDir::new().unwrap();

    let mut options = create_test_options(out.path(), 3);
    options.numbered = true;
    options.concurrency = 1;
    crawl(&format!("{}/docs/", server.uri()), options)
        .await
        .unwrap();

    assert!(out.path().join("01-index.md").exists());
    assert!(out.path().join("02-intro.md").exists());
    assert!(out.path().join("guide/01-setup.md").exists());
    assert!(out.path().join("guide/02-advanced.md").exists());
}

#[tokio::test]
async fn test_blocked_and_failed_pages() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/docs/",
        page("Home", &["/docs/ok", "/docs/challenge", "/docs/broken"]),
    )
    .await;
    serve(&server, "/docs/ok", page("Ok", &[])).await;
    serve(
        &server,
        "/docs/challenge",
        format!(
            "# Checking your browser before accessing the site\n\n{}",
            "This process is automatic. ".repeat(5)
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = crawl(
        &format!("{}/docs/", server.uri()),
        create_test_options(out.path(), 1),
    )
    .await
    .unwrap();

    assert_eq!(report.saved.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.blocked.len(), 1);
    assert!(matches!(
        &report.blocked[0],
        Outcome::Blocked { reason: BlockReason::Cloudflare, .. }
    ));
    assert!(!out.path().join("challenge.md").exists());
}

#[tokio::test]
async fn test_sitemap_crawl() {
    let server = MockServer::start().await;
    let uri = server.uri();

    serve(
        &server,
        "/sitemap.xml",
        format!(
            "<sitemapindex><sitemap><loc>{0}/docs-1.xml</loc></sitemap><sitemap><loc>{0}/docs-2.xml</loc></sitemap></sitemapindex>",
            uri
        ),
    )
    .await;
    serve(
        &server,
        "/docs-1.xml",
        format!(
            "<urlset><url><loc>{0}/docs/a</loc></url><url><loc>{0}/docs/b</loc></url></urlset>",
            uri
        ),
    )
    .await;
    serve(
        &server,
        "/docs-2.xml",
        format!(
            "<urlset><url><loc>{0}/docs/c</loc></url><url><loc>{0}/docs/a</loc></url><url><loc>{0}/blog/x</loc></url></urlset>",
            uri
        ),
    )
    .await;
    for name in ["a", "b", "c"] {
        serve(&server, &format!("/docs/{}", name), page(name, &["/docs/never"])).await;
    }

    let out = TempDir::new().unwrap();
    let mut options = create_test_options(out.path(), 0);
    options.mode = CrawlMode::Sitemap;

    let report = crawl(&format!("{}/docs/", uri), options).await.unwrap();

    assert_eq!(report.saved.len(), 3);
    assert!(out.path().join("a.md").exists());
    assert!(out.path().join("c.md").exists());
    assert!(!out.path().join("never.md").exists());
}

#[tokio::test]
async fn test_sitemap_unavailable() {
    let server = MockServer::start().await;
    let out = TempDir::new().unwrap();
    let mut options = create_test_options(out.path(), 0);
    options.mode = CrawlMode::Sitemap;

    let err = crawl(&format!("{}/docs/", server.uri()), options)
        .await
        .unwrap_err();
    assert!(matches!(err, MirrorError::SitemapUnavailable { .. }));
}
