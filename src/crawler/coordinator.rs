//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loops for both modes:
//! - Link mode: breadth-first traversal from the entry page, bounded by depth
//! - Sitemap mode: every page the site's sitemap lists
//!
//! Every URL goes through the same pipeline: adapter chain, output path (with optional
//! numbering), file write, and, in link mode, link extraction. Page-level problems become
//! [`Outcome`] values; only invocation-level problems return an error.

use crate::adapters::AdapterChain;
use crate::config::{CrawlMode, CrawlOptions};
use crate::crawler::parser::{extract_links, LinkOptions};
use crate::crawler::scheduler::{FrontierEntry, Scheduler};
use crate::crawler::sitemap::SitemapReader;
use crate::output::FileWriter;
use crate::state::{CrawlReport, NumberingCounter, Outcome};
use crate::url::{add_numbered_prefix, detect_base_path, to_local_path};
use crate::MirrorError;
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use url::Url;

/// Digits used for numbered file prefixes
const NUMBER_DIGITS: usize = 2;

/// Result of processing one page
struct PageResult {
    outcome: Outcome,
    links: Vec<Url>,
}

/// Main crawler coordinator structure
pub struct Coordinator {
    options: CrawlOptions,
    chain: Arc<AdapterChain>,
    writer: FileWriter,
    numbering: NumberingCounter,
    scheduler: Scheduler,
}

impl Coordinator {
    /// Creates a coordinator writing under `options.out_dir` through `chain`
    pub fn new(options: CrawlOptions, chain: Arc<AdapterChain>) -> Self {
        let writer = FileWriter::new(options.out_dir.clone());
        let scheduler = Scheduler::new(options.concurrency);

        Self {
            options,
            chain,
            writer,
            numbering: NumberingCounter::new(),
            scheduler,
        }
    }

    /// Runs the crawl from `entry` and returns the outcomes
    ///
    /// The adapter chain is not released here; the caller owns it.
    pub async fn run(
        &mut self,
        entry: &Url,
        sitemaps: Option<&SitemapReader>,
    ) -> Result<CrawlReport, MirrorError> {
        let mut report = CrawlReport::new(entry.as_str());
        let base_path = detect_base_path(entry);
        match &base_path {
            Some(base) => tracing::info!("Documentation base path: {}", base),
            None => tracing::debug!("No documentation base path detected for {}", entry),
        }

        match self.options.mode {
            CrawlMode::Links => self.crawl_links(entry, base_path, &mut report).await,
            CrawlMode::Sitemap => {
                let reader = sitemaps.ok_or_else(|| MirrorError::SitemapUnavailable {
                    url: entry.to_string(),
                })?;
                let urls = reader.discover(entry, base_path.as_deref()).await?;
                self.crawl_urls(filter_to_base(urls, base_path.as_deref()), &mut report)
                    .await;
            }
        }

        Ok(report)
    }

    /// Breadth-first traversal in concurrency-sized batches
    async fn crawl_links(&mut self, entry: &Url, base_path: Option<String>, report: &mut CrawlReport) {
        let link_options = LinkOptions {
            allow_external: false,
            base_path,
        };
        let max_depth = self.options.max_depth;

        self.scheduler.add_to_frontier(entry.clone(), 0);
        tracing::info!("Starting link crawl at {} (max depth {})", entry, max_depth);

        while !self.scheduler.is_empty() {
            let batch = self.scheduler.next_batch(self.options.concurrency);
            if batch.is_empty() {
                break;
            }

            let results = {
                let this = &*self;
                join_all(batch.iter().map(|FrontierEntry { url, depth }| {
                    let extract = (*depth < max_depth).then_some(&link_options);
                    this.process_page(url, extract)
                }))
                .await
            };

            for (entry, result) in batch.iter().zip(results) {
                let mut enqueued = 0;
                for link in result.links {
                    if self.scheduler.add_to_frontier(link, entry.depth + 1) {
                        enqueued += 1;
                    }
                }
                if enqueued > 0 {
                    tracing::debug!(
                        "Queued {} links from {} at depth {}",
                        enqueued,
                        entry.url,
                        entry.depth + 1
                    );
                }
                report.record(result.outcome);
            }

            tracing::info!(
                "Progress: {} processed, {} queued",
                report.total(),
                self.scheduler.frontier_size()
            );
        }
    }

    /// Processes a fixed URL set in concurrency-sized sequential chunks
    async fn crawl_urls(&mut self, urls: Vec<Url>, report: &mut CrawlReport) {
        let mut seen = HashSet::new();
        let urls: Vec<Url> = urls
            .into_iter()
            .filter(|u| seen.insert(u.to_string()))
            .collect();
        tracing::info!("Processing {} sitemap URLs", urls.len());

        for chunk in urls.chunks(self.options.concurrency.max(1)) {
            for url in chunk {
                self.scheduler.mark_visited(url);
            }

            let results = join_all(chunk.iter().map(|url| self.process_page(url, None))).await;
            for result in results {
                report.record(result.outcome);
            }

            tracing::info!("Progress: {}/{} processed", report.total(), urls.len());
        }
    }

    /// Fetches, saves and optionally mines one page
    ///
    /// Holds a concurrency permit for the whole pipeline.
    async fn process_page(&self, url: &Url, extract: Option<&LinkOptions>) -> PageResult {
        let _permit = self.scheduler.acquire().await;

        let page = match self.chain.fetch_markdown(url).await {
            Ok(page) => page,
            Err(e) => {
                let outcome = match e.block_reason() {
                    Some(reason) => {
                        tracing::warn!("Blocked {}: {}", url, reason.description());
                        Outcome::Blocked {
                            url: url.to_string(),
                            reason,
                        }
                    }
                    None => {
                        tracing::warn!("Failed {}: {}", url, e);
                        Outcome::Failed {
                            url: url.to_string(),
                            message: e.to_string(),
                        }
                    }
                };
                return PageResult {
                    outcome,
                    links: Vec::new(),
                };
            }
        };

        let mut relative = to_local_path(url);
        // Held until the write finishes; a failed write releases the number
        let reservation = if self.options.numbered {
            Some(self.numbering.reserve(&relative).await)
        } else {
            None
        };
        if let Some(reservation) = &reservation {
            relative = add_numbered_prefix(&relative, reservation.number(), NUMBER_DIGITS);
        }

        let outcome = match self.writer.save(&relative, &page.content).await {
            Ok(path) => {
                if let Some(reservation) = reservation {
                    reservation.commit();
                }
                if self.options.verbose {
                    tracing::info!("Saved {} -> {} ({})", url, path.display(), page.adapter);
                } else {
                    tracing::debug!("Saved {} -> {} ({})", url, path.display(), page.adapter);
                }
                Outcome::Saved {
                    url: url.to_string(),
                    local_path: relative,
                    adapter: page.adapter.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!("Failed to write {}: {}", url, e);
                Outcome::Failed {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        };

        let links = match extract {
            Some(options) => extract_links(&page.content, url, options),
            None => Vec::new(),
        };

        PageResult { outcome, links }
    }
}

/// Keeps URLs under the base path; falls back to the full set if none are
fn filter_to_base(urls: Vec<Url>, base_path: Option<&str>) -> Vec<Url> {
    let Some(base) = base_path else {
        return urls;
    };
    let prefix = base.trim_end_matches('/');
    let inside = |url: &Url| {
        let path = url.path();
        path == prefix || path.starts_with(&format!("{}/", prefix))
    };

    if urls.iter().any(inside) {
        urls.into_iter().filter(inside).collect()
    } else {
        tracing::warn!(
            "No sitemap URLs under {}, processing all {} URLs",
            base,
            urls.len()
        );
        urls
    }
}
