//! Crawler module for documentation mirroring
//!
//! This module contains the core crawling logic, including:
//! - HTTP client construction
//! - Link extraction from page content
//! - Sitemap discovery and flattening
//! - Frontier and concurrency management
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;
mod sitemap;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_text};
pub use parser::{extract_links, LinkOptions};
pub use scheduler::{FrontierEntry, Scheduler};
pub use sitemap::{parse_sitemap, SitemapDocument, SitemapReader};

use crate::adapters::AdapterChain;
use crate::config::{validate_options, CrawlOptions};
use crate::extract::SiteRegistry;
use crate::state::CrawlReport;
use crate::url::normalize_url;
use crate::{ConfigError, MirrorError};
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for mirroring a site. It will:
/// 1. Validate the options and the entry URL
/// 2. Build the HTTP client, site registry and adapter chain
/// 3. Crawl by links or by sitemap, writing Markdown under `options.out_dir`
/// 4. Release the adapters' resources (the shared browser) exactly once
///
/// # Arguments
///
/// * `entry_url` - Where the crawl starts
/// * `options` - The crawl options
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Per-URL outcomes, including blocked and failed pages
/// * `Err(MirrorError)` - Invalid entry URL or options, or no sitemap in sitemap mode
///
/// # Example
///
/// ```no_run
/// use docmirror::{crawl, CrawlOptions};
///
/// # async fn example() -> Result<(), docmirror::MirrorError> {
/// let report = crawl("https://docs.example.com/docs/", CrawlOptions::default()).await?;
/// println!("saved {} pages", report.saved.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(entry_url: &str, options: CrawlOptions) -> Result<CrawlReport, MirrorError> {
    validate_options(&options).map_err(|e| match e {
        ConfigError::Validation(message) => MirrorError::InvalidOptions(message),
        other => MirrorError::Config(other),
    })?;

    let entry = normalize_url(entry_url).map_err(|e| MirrorError::InvalidEntryUrl {
        url: entry_url.to_string(),
        reason: e.to_string(),
    })?;

    let client = build_http_client(&options.user_agent, options.page_timeout())?;
    let registry = Arc::new(SiteRegistry::with_entries(&options.sites));
    let chain = Arc::new(AdapterChain::standard(&options, client.clone(), registry));
    tracing::info!("Adapter chain: {}", chain.names().join(" -> "));

    let sitemaps = SitemapReader::new(client);
    let mut coordinator = Coordinator::new(options, Arc::clone(&chain));
    let result = coordinator.run(&entry, Some(&sitemaps)).await;

    chain.release().await;

    let mut report = result?;
    report.finish();
    tracing::info!(
        "Crawl complete: {} saved, {} blocked, {} failed",
        report.saved.len(),
        report.blocked.len(),
        report.failed.len()
    );

    Ok(report)
}
