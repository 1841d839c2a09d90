//! docmirror: mirror a documentation site as Markdown
//!
//! This crate crawls a documentation website, converts each page into clean Markdown
//! through a chain of content adapters, and mirrors the site's URL hierarchy into a
//! local file tree.

pub mod adapters;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for docmirror operations
///
/// Only invocation-level failures surface through this type. Per-page problems are
/// recorded as [`state::Outcome`] values and never abort a crawl.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid entry URL '{url}': {reason}")]
    InvalidEntryUrl { url: String, reason: String },

    #[error("Invalid crawl options: {0}")]
    InvalidOptions(String),

    #[error("No usable sitemap found for {url}")]
    SitemapUnavailable { url: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid host pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for docmirror operations
pub type Result<T> = std::result::Result<T, MirrorError>;

// Re-export commonly used types
pub use config::{AdapterKind, CrawlMode, CrawlOptions};
pub use crawler::crawl;
pub use state::{BlockReason, CrawlReport, Outcome};
pub use url::{add_numbered_prefix, detect_base_path, normalize_url, to_local_path};
